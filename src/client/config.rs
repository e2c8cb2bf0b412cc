use crate::shared::config::{AppConfig, AppConfigBuilder, ConfigError};
use std::path::PathBuf;
use std::time::Duration;

/// Default API base URL
const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Directory under the platform data dir holding the cache database
const CACHE_DIR_NAME: &str = "cms-client";
const CACHE_FILE_NAME: &str = "cache.db";

/// Client configuration wrapper.
#[derive(Debug, Clone, Default)]
pub struct Config {
    app: AppConfig,
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builder(builder: AppConfigBuilder) -> Result<Self, ConfigError> {
        Ok(Self { app: builder.build()? })
    }

    pub fn from_app_config(app: AppConfig) -> Result<Self, ConfigError> {
        app.validate()?;
        Ok(Self { app })
    }

    /// Layer `CMS_API_URL`, `CMS_CACHE_PATH` and `CMS_REQUEST_TIMEOUT_SECS` on
    /// top of `base`.
    pub fn from_env_with(base: AppConfig) -> Result<Self, ConfigError> {
        let mut app = base;
        if let Ok(url) = std::env::var("CMS_API_URL") {
            app.api_base_url = Some(url.trim_end_matches('/').to_string());
        }
        if let Ok(path) = std::env::var("CMS_CACHE_PATH") {
            app.cache_path = Some(PathBuf::from(path));
        }
        if let Ok(secs) = std::env::var("CMS_REQUEST_TIMEOUT_SECS") {
            let secs = secs
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::MissingValue("CMS_REQUEST_TIMEOUT_SECS must be an integer"))?;
            app.request_timeout_secs = Some(secs);
        }
        Self::from_app_config(app)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(AppConfig::default())
    }

    /// Get the full URL for an API endpoint
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url(), path)
    }

    pub fn api_base_url(&self) -> &str {
        self.app.api_base_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    /// Cache database location: configured path, else the platform data dir
    pub fn cache_path(&self) -> PathBuf {
        if let Some(path) = &self.app.cache_path {
            return path.clone();
        }
        let mut path = dirs::data_dir().unwrap_or_else(std::env::temp_dir);
        path.push(CACHE_DIR_NAME);
        path.push(CACHE_FILE_NAME);
        path
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.app.request_timeout_secs.map(Duration::from_secs)
    }
}
