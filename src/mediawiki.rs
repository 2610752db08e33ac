//! Fetching page source from the MediaWiki action API.

use minidom::Element;
use std::time::{Duration, Instant};

/// Errors that may occur when fetching page source.
#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    /// The HTTP request failed or returned an error status.
    #[error("could not fetch {url}: {source}")]
    Http {
        /// The requested URL.
        url: String,
        /// The underlying error.
        source: ureq::Error,
    },

    /// The API returned an error instead of a result.
    #[error("the wiki API returned an error ({code}): {info}")]
    Api {
        /// The error code.
        code: String,
        /// The error message.
        info: String,
    },

    /// The page does not exist, or has no revisions.
    #[error("the page “{page}” does not exist on {project}")]
    PageMissing {
        /// The wiki host name.
        project: String,
        /// The page name.
        page: String,
    },
}

/// A source of wiki page text.
pub(crate) trait Fetch: Send + Sync {
    /// Returns the current Wikitext source of `page` on the `project` wiki.
    fn fetch(&self, project: &str, page: &str) -> Result<String, Error>;
}

/// A client for the MediaWiki action API.
pub(crate) struct ApiClient {
    /// The HTTP agent.
    agent: ureq::Agent,
    /// The URL scheme used to reach the API.
    scheme: String,
    /// The `User-Agent` header value.
    user_agent: String,
}

impl ApiClient {
    /// The maximum time one page fetch may take.
    const TIMEOUT: Duration = Duration::from_secs(30);

    /// Creates a new API client.
    pub fn new(scheme: &str, user_agent: &str) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Self::TIMEOUT))
            .build()
            .into();
        Self {
            agent,
            scheme: scheme.into(),
            user_agent: user_agent.into(),
        }
    }
}

impl Fetch for ApiClient {
    fn fetch(&self, project: &str, page: &str) -> Result<String, Error> {
        let url = format!("{}://{project}/w/api.php", self.scheme);
        let time = Instant::now();
        let body = self
            .agent
            .get(url.as_str())
            .query("action", "query")
            .query("prop", "revisions")
            .query("titles", page)
            .query("rvprop", "content")
            .query("format", "xml")
            .header("User-Agent", self.user_agent.as_str())
            .call()
            .and_then(|response| response.into_body().read_to_string())
            .map_err(|source| Error::Http {
                url: url.clone(),
                source,
            })?;
        log::trace!("Fetched {url} in {:.2?}", time.elapsed());
        page_source(&body, project, page)
    }
}

/// Extracts the page source from an XML `action=query&prop=revisions`
/// response body.
///
/// If the body is not well-formed XML, the text of the first `<rev>` element
/// is sliced out of it instead.
pub(crate) fn page_source(body: &str, project: &str, page: &str) -> Result<String, Error> {
    let missing = || Error::PageMissing {
        project: project.into(),
        page: page.into(),
    };

    match parse_envelope(body) {
        Ok(Envelope::Source(source)) => Ok(source),
        Ok(Envelope::Missing) => Err(missing()),
        Ok(Envelope::Error { code, info }) => Err(Error::Api { code, info }),
        Err(error) => {
            log::warn!("Malformed API response for [[{page}]] on {project}: {error}");
            slice_revision(body).ok_or_else(missing)
        }
    }
}

/// The meaningful content of an API response.
#[derive(Debug, Eq, PartialEq)]
enum Envelope {
    /// The page source.
    Source(String),
    /// The page or its revision is missing.
    Missing,
    /// An API error.
    Error { code: String, info: String },
}

/// Parses an API response.
fn parse_envelope(body: &str) -> Result<Envelope, minidom::Error> {
    let body = body.trim_start();
    let body = if body.starts_with("<?xml")
        && let Some(end) = body.find("?>")
    {
        &body[end + "?>".len()..]
    } else {
        body
    };

    let root = format!(r#"<response xmlns="">{body}</response>"#).parse::<Element>()?;
    let Some(api) = root.get_child("api", "") else {
        return Ok(Envelope::Missing);
    };

    if let Some(error) = api.get_child("error", "") {
        return Ok(Envelope::Error {
            code: error.attr("code").unwrap_or_default().into(),
            info: error.attr("info").unwrap_or_default().into(),
        });
    }

    let revision = api
        .get_child("query", "")
        .and_then(|query| query.get_child("pages", ""))
        .and_then(|pages| pages.get_child("page", ""))
        .filter(|page| page.attr("missing").is_none() && page.attr("invalid").is_none())
        .and_then(|page| page.get_child("revisions", ""))
        .and_then(|revisions| revisions.get_child("rev", ""));

    Ok(match revision {
        Some(rev) => {
            let slot = rev
                .get_child("slots", "")
                .and_then(|slots| slots.get_child("slot", ""));
            Envelope::Source(slot.unwrap_or(rev).text())
        }
        None => Envelope::Missing,
    })
}

/// Slices the text of the first `<rev>` element out of a response body
/// without parsing it.
fn slice_revision(body: &str) -> Option<String> {
    let start = body.find("<rev ").or_else(|| body.find("<rev>"))?;
    let open_end = start + body[start..].find('>')?;
    if body[..open_end].ends_with('/') {
        return None;
    }
    let text = &body[open_end + 1..];
    let end = text.find("</rev>")?;
    Some(html_escape::decode_html_entities(&text[..end]).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<?xml version="1.0"?><api batchcomplete=""><warnings><main xml:space="preserve">Subscribe to the mediawiki-api-announce mailing list.</main></warnings><query><pages><page _idx="3422" pageid="3422" ns="0" title="Example"><revisions><rev contentformat="text/x-wiki" contentmodel="wikitext" xml:space="preserve">{{Visualizer}}
{| class=&quot;wikitable&quot;
! A &amp; B !! C
|}</rev></revisions></page></pages></query></api>"#;

    const SOURCE: &str = "{{Visualizer}}\n{| class=\"wikitable\"\n! A & B !! C\n|}";

    #[test]
    fn present() {
        assert_eq!(page_source(PAGE, "en.wikipedia.org", "Example").unwrap(), SOURCE);
    }

    #[test]
    fn slots() {
        let body = r#"<api><query><pages><page title="X"><revisions><rev><slots><slot contentmodel="wikitext" role="main" xml:space="preserve">text &lt;b&gt;</slot></slots></rev></revisions></page></pages></query></api>"#;
        assert_eq!(page_source(body, "en.wikipedia.org", "X").unwrap(), "text <b>");
    }

    #[test]
    fn missing() {
        let body = r#"<?xml version="1.0"?><api batchcomplete=""><query><pages><page _idx="-1" ns="0" title="Nope" missing="" /></pages></query></api>"#;
        assert!(matches!(
            page_source(body, "en.wikipedia.org", "Nope"),
            Err(Error::PageMissing { project, page }) if project == "en.wikipedia.org" && page == "Nope"
        ));

        let body = r#"<api><query><pages><page title="Bad|Name" invalid="" /></pages></query></api>"#;
        assert!(matches!(
            page_source(body, "en.wikipedia.org", "Bad|Name"),
            Err(Error::PageMissing { .. })
        ));
    }

    #[test]
    fn api_error() {
        let body = r#"<?xml version="1.0"?><api><error code="readapidenied" info="You need read permission to use this module." /></api>"#;
        assert!(matches!(
            page_source(body, "en.wikipedia.org", "X"),
            Err(Error::Api { code, .. }) if code == "readapidenied"
        ));
    }

    #[test]
    fn malformed_fallback() {
        let body = r#"<api><query><pages><page><revisions><rev xml:space="preserve">a &amp; b &lt; c</rev></revisions></page></pages></query></api"#;
        assert_eq!(page_source(body, "en.wikipedia.org", "X").unwrap(), "a & b < c");

        let body = "<html><body>Service unavailable</body></html";
        assert!(matches!(
            page_source(body, "en.wikipedia.org", "X"),
            Err(Error::PageMissing { .. })
        ));
    }

    #[test]
    fn slicing() {
        assert_eq!(slice_revision("<revisions><rev>x</rev>").as_deref(), Some("x"));
        assert_eq!(slice_revision("<rev a=\"b\" />").as_deref(), None);
        assert_eq!(slice_revision("<rev a=\"b\">unterminated"), None);
    }
}
