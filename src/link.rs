//! Search link construction.
//!
//! Turns a finished query into a search engine URL using form encoding
//! (space becomes `+`, reserved characters are percent-escaped).

use std::process::Command;

use url::form_urlencoded;

use crate::config::ScoutConfig;
use crate::error::{ScoutError, ScoutResult};

pub const DEFAULT_SEARCH_URL: &str = "https://www.google.com/search";
pub const DEFAULT_QUERY_PARAM: &str = "q";

/// Builds search URLs for composed queries.
#[derive(Debug, Clone)]
pub struct LinkOpener {
    base_url: String,
    param: String,
}

impl Default for LinkOpener {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_URL)
    }
}

impl LinkOpener {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            param: DEFAULT_QUERY_PARAM.to_string(),
        }
    }

    pub fn from_config(config: &ScoutConfig) -> Self {
        Self::new(config.search_url.clone()).with_param(config.query_param.clone())
    }

    /// Use a different query parameter name.
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.param = param.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the search URL, or `None` when there is nothing to search.
    pub fn url(&self, query: &str) -> Option<String> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        let sep = if self.base_url.contains('?') { '&' } else { '?' };
        Some(format!(
            "{}{}{}={}",
            self.base_url,
            sep,
            encode(&self.param),
            encode(query)
        ))
    }

    /// Launch the platform browser on the search URL.
    ///
    /// Returns the URL that was opened, or `None` for an empty query.
    pub fn open(&self, query: &str) -> ScoutResult<Option<String>> {
        let Some(url) = self.url(query) else {
            return Ok(None);
        };
        tracing::info!(%url, "opening browser");
        let status = browser_command(&url).status()?;
        if !status.success() {
            return Err(ScoutError::Io(std::io::Error::other(format!(
                "browser launcher exited with {}",
                status
            ))));
        }
        Ok(Some(url))
    }
}

/// Form-encode a query string value.
pub fn encode(s: &str) -> String {
    form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

/// Reverse [`encode`].
pub fn decode(s: &str) -> String {
    form_urlencoded::parse(format!("v={}", s).as_bytes())
        .next()
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default()
}

/// Pull the query parameter back out of a search URL.
pub fn query_from_url(url: &str, param: &str) -> Option<String> {
    let (_, qs) = url.split_once('?')?;
    form_urlencoded::parse(qs.as_bytes())
        .find(|(k, _)| k == param)
        .map(|(_, v)| v.into_owned())
}

#[cfg(target_os = "macos")]
fn browser_command(url: &str) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(url);
    cmd
}

#[cfg(target_os = "windows")]
fn browser_command(url: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", "", url]);
    cmd
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn browser_command(url: &str) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(url);
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_url() {
        let link = LinkOpener::default();
        assert_eq!(
            link.url("site:example.com").as_deref(),
            Some("https://www.google.com/search?q=site%3Aexample.com")
        );
    }

    #[test]
    fn test_spaces_and_quotes() {
        let link = LinkOpener::default();
        assert_eq!(
            link.url("\"tesla\" AROUND(3) \"edison\"").as_deref(),
            Some("https://www.google.com/search?q=%22tesla%22+AROUND%283%29+%22edison%22")
        );
    }

    #[test]
    fn test_empty_query_has_no_link() {
        let link = LinkOpener::default();
        assert_eq!(link.url(""), None);
        assert_eq!(link.url("   "), None);
    }

    #[test]
    fn test_custom_base() {
        let link = LinkOpener::new("https://duckduckgo.com/?ia=web");
        assert_eq!(
            link.url("seo tips").as_deref(),
            Some("https://duckduckgo.com/?ia=web&q=seo+tips")
        );
    }

    #[test]
    fn test_encode_decode() {
        let q = "(seo | marketing) -\"my brand\" $10..$20 site:example.com/blog";
        let encoded = encode(q);
        assert!(!encoded.contains(' '));
        assert_eq!(decode(&encoded), q);
    }

    #[test]
    fn test_query_from_url() {
        let link = LinkOpener::default();
        let q = "intitle:\"write for us\" & more";
        let url = link.url(q).unwrap();
        assert_eq!(query_from_url(&url, "q").as_deref(), Some(q));
        assert_eq!(query_from_url(&url, "x"), None);
    }
}
