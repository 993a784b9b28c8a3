//! Static configuration for the news provider and local storage.
//!
//! Values come from an optional YAML file (`--config`) and are then
//! overridden by command-line flags and their environment variables.
//!
//! ```yaml
//! api_key: "0123456789abcdef"
//! base_url: "https://newsapi.org/v2"
//! placeholder_image: "https://via.placeholder.com/600x400?text=No+image"
//! settings_file: "/home/me/.config/awful_news_feed/settings.json"
//! timeout_secs: 30
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument};

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2";
pub const DEFAULT_PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/600x400?text=No+image";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid base url {url:?}: {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("no API key configured (pass --api-key, set NEWS_API_KEY, or add api_key to the config file)")]
    MissingApiKey,
}

/// Provider and storage settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NewsConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub placeholder_image: String,
    pub settings_file: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            placeholder_image: DEFAULT_PLACEHOLDER_IMAGE.to_string(),
            settings_file: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl NewsConfig {
    /// The configured API key, or [`ConfigError::MissingApiKey`] when none
    /// (or only whitespace) was given.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Where persisted filters live: the configured file, or
    /// `<config dir>/awful_news_feed/settings.json`.
    pub fn settings_path(&self) -> PathBuf {
        self.settings_file.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(env!("CARGO_PKG_NAME"))
                .join("settings.json")
        })
    }
}

/// Load a [`NewsConfig`] from a YAML file. Missing fields take their defaults.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn load_config(path: &Path) -> Result<NewsConfig, ConfigError> {
    let display = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: display.clone(),
        source,
    })?;
    let config: NewsConfig = serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: display,
        source,
    })?;
    info!(base_url = %config.base_url, has_api_key = config.api_key.is_some(), "Loaded configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = NewsConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.settings_path().ends_with("awful_news_feed/settings.json"));
    }

    #[test]
    fn test_load_partial_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_key: abc\ntimeout_secs: 5").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("abc"));
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.placeholder_image, DEFAULT_PLACEHOLDER_IMAGE);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timeout_secs: [not, a, number]").unwrap();
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_require_api_key() {
        let mut config = NewsConfig::default();
        assert!(matches!(config.require_api_key(), Err(ConfigError::MissingApiKey)));
        config.api_key = Some("   ".into());
        assert!(config.require_api_key().is_err());
        config.api_key = Some(" key ".into());
        assert_eq!(config.require_api_key().unwrap(), "key");
    }
}
