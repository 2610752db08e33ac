//! Finding the wikitable that follows a labelling template.

use std::num::NonZeroUsize;

/// Errors that may occur when locating a wikitable.
#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub(crate) enum Error {
    /// The page never invokes the template.
    #[error("the page does not contain the string {{{{{0}; check the template parameter tpl=")]
    TemplateNotFound(String),

    /// The page invokes the template, but fewer times than requested.
    #[error(
        "the page does not include the template {template} as many times as requested ({requested}); check the template id parameter id="
    )]
    NotEnoughTemplates {
        /// The template name.
        template: String,
        /// The requested 1-based occurrence.
        requested: NonZeroUsize,
    },

    /// There is no header row after the template.
    #[error(
        "“!” not found in the wikitable after the template {0}; the table columns should have titles using “!” instead of “|”"
    )]
    MissingHeader(String),

    /// The table after the template is never closed.
    #[error("the page does not contain the line “|}}” after the template {0}")]
    NoTableEnd(String),
}

/// Finds the wikitable that follows the `occurrence`th invocation of
/// `template` in `source` and returns its text, starting at the first header
/// cell marker and ending just before the table end marker.
///
/// The first letter of the template name is matched case-insensitively, the
/// same way MediaWiki resolves template names.
pub(crate) fn locate_table<'a>(
    source: &'a str,
    template: &str,
    occurrence: NonZeroUsize,
) -> Result<&'a str, Error> {
    let upper = with_first_letter(template, char::to_uppercase);
    let lower = with_first_letter(template, char::to_lowercase);

    let mut invocations = invocations(source, &upper, &lower).peekable();
    if invocations.peek().is_none() {
        return Err(Error::TemplateNotFound(template.into()));
    }

    let start = invocations
        .nth(occurrence.get() - 1)
        .ok_or_else(|| Error::NotEnoughTemplates {
            template: template.into(),
            requested: occurrence,
        })?;

    let rest = &source[start..];
    let header = rest
        .find('!')
        .ok_or_else(|| Error::MissingHeader(template.into()))?;
    let table = &rest[header..];
    let end = table
        .find("\n|}")
        .ok_or_else(|| Error::NoTableEnd(template.into()))?;

    Ok(&table[..end])
}

/// Returns an iterator over the byte offsets of every `{{` in `source` which
/// is followed by one of the two spellings of a template name.
fn invocations<'a>(
    source: &'a str,
    upper: &'a str,
    lower: &'a str,
) -> impl Iterator<Item = usize> + 'a {
    let mut offset = 0;
    core::iter::from_fn(move || {
        while let Some(found) = source[offset..].find("{{") {
            let start = offset + found;
            offset = start + 1;
            let name = &source[start + "{{".len()..];
            if name.starts_with(upper) || name.starts_with(lower) {
                return Some(start);
            }
        }
        None
    })
}

/// Returns `name` with its first letter case-mapped by `f`.
fn with_first_letter<I>(name: &str, f: impl FnOnce(char) -> I) -> String
where
    I: Iterator<Item = char>,
{
    let mut iter = name.chars();
    if let Some(first) = iter.next() {
        f(first).chain(iter).collect()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "Intro text.\n\
        {{Visualizer}}\n\
        {| class=\"wikitable\"\n\
        ! Year !! Sales\n\
        |-\n\
        | 2004 || 1000\n\
        |}\n\
        Between.\n\
        {{visualizer|second}}\n\
        {| class=\"wikitable\"\n\
        ! Month !! Visits\n\
        |-\n\
        | Jan || 5\n\
        |}\n";

    fn nth(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn first_occurrence() {
        assert_eq!(
            locate_table(PAGE, "visualizer", nth(1)),
            Ok("! Year !! Sales\n|-\n| 2004 || 1000")
        );
    }

    #[test]
    fn later_occurrence_with_other_case() {
        assert_eq!(
            locate_table(PAGE, "Visualizer", nth(2)),
            Ok("! Month !! Visits\n|-\n| Jan || 5")
        );
    }

    #[test]
    fn not_found() {
        assert_eq!(
            locate_table(PAGE, "chart", nth(1)),
            Err(Error::TemplateNotFound("chart".into()))
        );
    }

    #[test]
    fn not_enough_occurrences() {
        let page = "{{Visualizer}}\n{|\n! a !! b\n|-\n| 1 || 2\n|}";
        assert_eq!(
            locate_table(page, "visualizer", nth(2)),
            Err(Error::NotEnoughTemplates {
                template: "visualizer".into(),
                requested: nth(2),
            })
        );
    }

    #[test]
    fn missing_header() {
        assert_eq!(
            locate_table("{{Visualizer}}\n{|\n| a || b\n|}", "Visualizer", nth(1)),
            Err(Error::MissingHeader("Visualizer".into()))
        );
    }

    #[test]
    fn no_table_end() {
        assert_eq!(
            locate_table("{{Visualizer}}\n{|\n! a !! b\n|-\n| 1 || 2\n", "Visualizer", nth(1)),
            Err(Error::NoTableEnd("Visualizer".into()))
        );
    }

    #[test]
    fn first_letter_only() {
        assert_eq!(
            locate_table("{{VISUALIZER}}\n{|\n! a\n|}", "visualizer", nth(1)),
            Err(Error::TemplateNotFound("visualizer".into()))
        );
        assert_eq!(with_first_letter("élan", char::to_uppercase), "Élan");
        assert_eq!(with_first_letter("", char::to_uppercase), "");
    }
}
