//! Application configuration module
//!
//! Provides configuration types for the application. Values come from a TOML
//! file, the builder, or both (the client `Config` layers environment
//! variables on top).
//!
//! ```toml
//! api_base_url = "http://localhost:3000"
//! cache_path = "/var/lib/cms/cache.db"
//! request_timeout_secs = 30
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Base URL of the complaint API
    pub api_base_url: Option<String>,
    /// Location of the local cache database
    pub cache_path: Option<PathBuf>,
    /// Per-request timeout; unset means requests never time out
    pub request_timeout_secs: Option<u64>,
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.api_base_url {
            let parsed =
                reqwest::Url::parse(url).map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", url, e)))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::InvalidUrl(format!("{}: unsupported scheme", url)));
            }
        }
        if self.request_timeout_secs == Some(0) {
            return Err(ConfigError::MissingValue("request_timeout_secs must be positive"));
        }
        Ok(())
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    api_base_url: Option<String>,
    cache_path: Option<PathBuf>,
    request_timeout_secs: Option<u64>,
}

impl AppConfigBuilder {
    /// Set the API base URL
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    pub fn cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let config = AppConfig {
            api_base_url: self.api_base_url.map(|url| url.trim_end_matches('/').to_string()),
            cache_path: self.cache_path,
            request_timeout_secs: self.request_timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
