//! Interface messages.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// The interface messages of one language.
#[derive(Debug)]
pub(crate) struct Messages {
    /// The language code.
    pub code: &'static str,
    /// The name of the tool.
    pub title: &'static str,
    /// The data source line. `$1` is replaced by a link to the page and `$2`
    /// by the wiki host name.
    pub info: &'static str,
    /// Whether the language is written right to left.
    pub rtl: bool,
}

/// The default messages.
const ENGLISH: Messages = Messages {
    code: "en",
    title: "Wikitable visualizer tool",
    info: "Data source is $1 on $2.",
    rtl: false,
};

/// Messages by language code.
static MESSAGES: phf::Map<&'static str, Messages> = phf::phf_map! {
    "en" => ENGLISH,
    "fr" => Messages {
        code: "fr",
        title: "Outil de visualisation de tableaux",
        info: "La source des données est $1 sur $2.",
        rtl: false,
    },
    "hu" => Messages {
        code: "hu",
        title: "Diagramvarázsló",
        info: "Az adatok forrása a $2 $1 szócikke.",
        rtl: false,
    },
};

/// Characters which are percent-encoded in a page name link. Namespace
/// separators and subpage separators are kept.
const PAGE_NAME: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Returns the messages for a language, or the English messages if the
/// language is unknown.
pub(crate) fn messages(lang: &str) -> &'static Messages {
    MESSAGES.get(lang).unwrap_or(&ENGLISH)
}

/// Returns the URL of a page on a wiki.
pub(crate) fn page_url(scheme: &str, project: &str, page: &str) -> String {
    format!(
        "{scheme}://{project}/wiki/{}",
        utf8_percent_encode(page, PAGE_NAME)
    )
}

/// Renders the data source line as HTML, linking to the page.
pub(crate) fn info_html(messages: &Messages, url: &str, project: &str, page: &str) -> String {
    let link = format!(
        "<a href=\"{}\">{}</a>",
        html_escape::encode_double_quoted_attribute(url),
        html_escape::encode_text(&page.replace('_', " "))
    );
    let project = html_escape::encode_text(project);

    let mut out = String::new();
    let mut rest = messages.info;
    while let Some(index) = rest.find('$') {
        out += &html_escape::encode_text(&rest[..index]);
        let after = &rest[index + 1..];
        if let Some(after) = after.strip_prefix('1') {
            out += &link;
            rest = after;
        } else if let Some(after) = after.strip_prefix('2') {
            out += &project;
            rest = after;
        } else {
            out.push('$');
            rest = after;
        }
    }
    out += &html_escape::encode_text(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn languages() {
        assert_eq!(messages("fr").title, "Outil de visualisation de tableaux");
        assert_eq!(messages("xx").title, "Wikitable visualizer tool");
        assert_eq!(messages("xx").code, "en");
        assert_eq!(messages("API").info, "Data source is $1 on $2.");
    }

    #[test]
    fn urls() {
        assert_eq!(
            page_url("https", "en.wikipedia.org", "Template:Visualizer/Test"),
            "https://en.wikipedia.org/wiki/Template:Visualizer/Test"
        );
        assert_eq!(
            page_url("http", "fr.wikipedia.org", "Côte_d'Ivoire?x"),
            "http://fr.wikipedia.org/wiki/C%C3%B4te_d%27Ivoire%3Fx"
        );
    }

    #[test]
    fn info() {
        let url = page_url("https", "en.wikipedia.org", "A_&_B");
        assert_eq!(
            info_html(messages("en"), &url, "en.wikipedia.org", "A_&_B"),
            "Data source is <a href=\"https://en.wikipedia.org/wiki/A_%26_B\">A &amp; B</a> on en.wikipedia.org."
        );
        assert_eq!(
            info_html(messages("hu"), &url, "hu.wikipedia.org", "Lap"),
            "Az adatok forrása a hu.wikipedia.org <a href=\"https://en.wikipedia.org/wiki/A_%26_B\">Lap</a> szócikke."
        );
    }
}
