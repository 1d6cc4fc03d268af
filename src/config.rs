//! Scout configuration.
//!
//! Read from TOML. Lookup order: an explicit path, `./scout.toml`, then
//! `<config dir>/scout/config.toml`. Missing files fall back to defaults.
//!
//! ```toml
//! search_url = "https://www.google.com/search"
//! query_param = "q"
//! open_browser = false
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ScoutError, ScoutResult};
use crate::link::{DEFAULT_QUERY_PARAM, DEFAULT_SEARCH_URL};

pub const LOCAL_CONFIG: &str = "scout.toml";

/// Main scout configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoutConfig {
    /// Search endpoint the query is appended to
    pub search_url: String,

    /// Query parameter name
    pub query_param: String,

    /// Launch the browser after composing
    pub open_browser: bool,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.to_string(),
            query_param: DEFAULT_QUERY_PARAM.to_string(),
            open_browser: false,
        }
    }
}

impl ScoutConfig {
    pub fn builder() -> ScoutConfigBuilder {
        ScoutConfigBuilder::default()
    }

    /// Parse a TOML document.
    pub fn from_toml(content: &str) -> ScoutResult<Self> {
        let config: ScoutConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file.
    pub fn from_file(path: &Path) -> ScoutResult<Self> {
        let content = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Self::from_toml(&content)
    }

    /// Load from `explicit` if given, else the first config found, else defaults.
    pub fn load(explicit: Option<&Path>) -> ScoutResult<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match Self::discover() {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// The first existing config file in lookup order.
    pub fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(LOCAL_CONFIG);
        if local.exists() {
            return Some(local);
        }
        dirs::config_dir()
            .map(|dir| dir.join("scout").join("config.toml"))
            .filter(|p| p.exists())
    }

    fn validate(&self) -> ScoutResult<()> {
        let url = self.search_url.trim();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ScoutError::Config(format!(
                "search_url must be an http(s) URL, got '{}'",
                self.search_url
            )));
        }
        if self.query_param.trim().is_empty() {
            return Err(ScoutError::Config("query_param must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Builder for ScoutConfig
#[derive(Debug, Default)]
pub struct ScoutConfigBuilder {
    config: ScoutConfig,
}

impl ScoutConfigBuilder {
    pub fn search_url(mut self, url: impl Into<String>) -> Self {
        self.config.search_url = url.into();
        self
    }

    pub fn query_param(mut self, param: impl Into<String>) -> Self {
        self.config.query_param = param.into();
        self
    }

    pub fn open_browser(mut self, open: bool) -> Self {
        self.config.open_browser = open;
        self
    }

    pub fn build(self) -> ScoutResult<ScoutConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
