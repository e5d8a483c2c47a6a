//! Configuration for the wiki gateway.
//!
//! Settings are read from a TOML file in the platform config directory and
//! can be overridden with `WIKIQ_*` environment variables.
//!
//! ## Configuration Hierarchy
//!
//! 1. **Defaults**: public Wikipedia API, English
//! 2. **Config file**: `<config_dir>/config.toml`
//! 3. **Environment variables**: `WIKIQ_API_URL`, `WIKIQ_LANG`, `WIKIQ_TIMEOUT_SECS`
//!
//! ## Example Configuration File
//!
//! ```toml
//! api_url = "https://{lang}.wikipedia.org/w/api.php"
//! lang = "pt"
//! load_on_get = true
//! timeout_secs = 30
//! user_agent = "my-tool/1.0 (me@example.org)"
//! ```
//!
//! ```rust
//! use wikiq_core::WikiConfig;
//!
//! let config = WikiConfig { lang: "pt".to_string(), ..WikiConfig::default() };
//! assert_eq!(config.resolved_api_url()?, "https://pt.wikipedia.org/w/api.php");
//! # Ok::<(), wikiq_core::Error>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::transport::default_user_agent;
use crate::{Error, Result};

/// Default API URL template. `{lang}` is replaced with [`WikiConfig::lang`].
pub const DEFAULT_API_URL: &str = "https://{lang}.wikipedia.org/w/api.php";

/// Settings for a [`Wiki`](crate::Wiki) gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WikiConfig {
    /// API endpoint template; `{lang}` is substituted with `lang`.
    pub api_url: String,

    /// Language code of the wiki (e.g. `en`, `pt`).
    pub lang: String,

    /// Whether `get_page` loads the page before returning it.
    pub load_on_get: bool,

    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,

    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            lang: "en".to_string(),
            load_on_get: true,
            timeout_secs: 30,
            user_agent: default_user_agent().to_string(),
        }
    }
}

impl WikiConfig {
    /// Load configuration from the default location, falling back to defaults.
    ///
    /// Environment overrides are applied afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a specific TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {e}")))?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("Failed to parse config: {e}")))
    }

    /// Write the configuration as TOML to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {e}")))?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config: {e}")))?;
        Ok(())
    }

    /// Apply `WIKIQ_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("WIKIQ_API_URL") {
            self.api_url = url;
        }
        if let Some(lang) = lookup("WIKIQ_LANG") {
            self.lang = lang;
        }
        if let Some(secs) = lookup("WIKIQ_TIMEOUT_SECS") {
            self.timeout_secs = secs
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("Invalid WIKIQ_TIMEOUT_SECS '{secs}': {e}")))?;
        }
        Ok(())
    }

    /// The API URL with the language code substituted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if the result is not an absolute URL.
    pub fn resolved_api_url(&self) -> Result<String> {
        let url = self.api_url.replace("{lang}", &self.lang);
        Url::parse(&url).map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))?;
        Ok(url)
    }

    /// Request timeout as a `Duration`.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Location of the config file, when a config directory is available.
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("org", "wikiq", "wikiq")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
