use std::time::Duration;

use semver::Version;
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub directories: DirectoryConfig,
    pub logging: LoggingConfig,
    pub timezone: String,
    pub cache: CacheConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    pub process_path: String,
    pub timeout: Duration,
}

impl ApiConfig {
    /// Absolute URL of the classification endpoint.
    pub fn process_url(&self) -> Result<Url, url::ParseError> {
        self.base_url.join(&self.process_path)
    }
}

#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub logs_dir: String,
    pub data_dir: String,
    pub storage_filename: String,
    pub cache_filename: String,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub prefix: String,
    pub version: Version,
    pub skip_waiting: bool,
    pub precache: Vec<String>,
}

impl CacheConfig {
    pub fn cache_name(&self) -> String {
        format!("{}-v{}", self.prefix, self.version)
    }
}

#[derive(Debug, Clone)]
pub struct UiConfig {
    pub debounce: Duration,
    pub auto_submit_min_chars: usize,
    pub notification_ttl: Duration,
    pub reset_delay: Duration,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(2_000),
            auto_submit_min_chars: 10,
            notification_ttl: Duration::from_millis(3_000),
            reset_delay: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}
