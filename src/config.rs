//! Server configuration and the wikis whose pages may be visualized.

use std::ffi::OsString;

/// Second-level domains of the wikis whose pages may be fetched.
static PROJECT_DOMAINS: phf::Set<&'static str> = phf::phf_set! {
    "mediawiki.org",
    "wikibooks.org",
    "wikimedia.org",
    "wikinews.org",
    "wikipedia.org",
    "wikiquote.org",
    "wikisource.org",
    "wikiversity.org",
    "wiktionary.org",
};

/// Returns true if `project` is the host name of a wiki on one of the
/// allowed domains, like `en.wikipedia.org`.
pub(crate) fn is_allowed_project(project: &str) -> bool {
    project.split_once('.').is_some_and(|(site, domain)| {
        !site.is_empty()
            && site.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
            && PROJECT_DOMAINS.contains(domain)
    })
}

/// Errors that may occur when reading the server configuration.
#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    /// A command-line argument could not be read.
    #[error(transparent)]
    Args(#[from] pico_args::Error),

    /// The MediaWiki API scheme is not one that can be used.
    #[error("unsupported API scheme “{0}”; use http or https")]
    Scheme(String),

    /// Unknown command-line arguments were given.
    #[error("unknown extra arguments: {0:?}")]
    Extra(Vec<OsString>),
}

/// Server settings.
#[derive(Clone, Debug)]
pub(crate) struct Config {
    /// The address the web server listens on.
    pub listen: String,
    /// The URL scheme used to reach the MediaWiki API.
    pub api_scheme: String,
    /// The `User-Agent` sent to the MediaWiki API.
    pub user_agent: String,
}

impl Config {
    /// Reads the configuration from command-line arguments, falling back to
    /// environment variables and then to defaults.
    pub fn from_args(mut args: pico_args::Arguments) -> Result<Self, Error> {
        let listen = opt_arg(&mut args, "--listen", "WIKIVIZ_LISTEN")?
            .unwrap_or_else(|| "127.0.0.1:3000".into());
        let api_scheme = opt_arg(&mut args, "--api-scheme", "WIKIVIZ_API_SCHEME")?
            .unwrap_or_else(|| "http".into());
        let user_agent = opt_arg(&mut args, "--user-agent", "WIKIVIZ_USER_AGENT")?
            .unwrap_or_else(|| concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).into());

        if !matches!(api_scheme.as_str(), "http" | "https") {
            return Err(Error::Scheme(api_scheme));
        }

        let rest = args.finish();
        if !rest.is_empty() {
            return Err(Error::Extra(rest));
        }

        Ok(Self {
            listen,
            api_scheme,
            user_agent,
        })
    }
}

/// Reads an optional flag value, or the environment variable `key` if the
/// flag is not given.
fn opt_arg(
    args: &mut pico_args::Arguments,
    flag: &'static str,
    key: &str,
) -> Result<Option<String>, pico_args::Error> {
    Ok(args
        .opt_value_from_str::<_, String>(flag)?
        .or_else(|| std::env::var(key).ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(args: &[&str]) -> pico_args::Arguments {
        pico_args::Arguments::from_vec(args.iter().map(OsString::from).collect())
    }

    #[test]
    fn projects() {
        assert!(is_allowed_project("en.wikipedia.org"));
        assert!(is_allowed_project("zh-min-nan.wikipedia.org"));
        assert!(is_allowed_project("commons.wikimedia.org"));
        assert!(is_allowed_project("fr.wiktionary.org"));
        assert!(!is_allowed_project("wikipedia.org"));
        assert!(!is_allowed_project(".wikipedia.org"));
        assert!(!is_allowed_project("en.wikipedia.org.evil.com"));
        assert!(!is_allowed_project("evil.com/x?.wikipedia.org"));
        assert!(!is_allowed_project("en.example.org"));
        assert!(!is_allowed_project(""));
    }

    #[test]
    fn flags() {
        let config = Config::from_args(args(&[
            "--listen",
            "0.0.0.0:8080",
            "--api-scheme",
            "https",
            "--user-agent",
            "test/1.0",
        ]))
        .unwrap();
        assert_eq!(config.listen, "0.0.0.0:8080");
        assert_eq!(config.api_scheme, "https");
        assert_eq!(config.user_agent, "test/1.0");
    }

    #[test]
    fn bad_flags() {
        assert!(matches!(
            Config::from_args(args(&["--api-scheme", "ftp"])),
            Err(Error::Scheme(scheme)) if scheme == "ftp"
        ));
        assert!(matches!(
            Config::from_args(args(&["--api-scheme", "http", "extra"])),
            Err(Error::Extra(_))
        ));
    }
}
