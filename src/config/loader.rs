use std::{env, str::FromStr, time::Duration};

use semver::Version;
use url::Url;

use super::env::{
    ApiConfig, AppConfig, CacheConfig, ConfigError, DirectoryConfig, LoggingConfig, UiConfig,
};

pub const DEFAULT_PRECACHE: &[&str] = &[
    "/",
    "/static/styles.css",
    "/static/app.js",
    "/static/manifest.json",
    "https://cdn.tailwindcss.com",
    "https://unpkg.com/alpinejs@3.x.x/dist/cdn.min.js",
];

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_env()
}

impl AppConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = env::var("AUTOU_BASE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8000".to_string());
        let base_url = Url::parse(&base_url).map_err(|err| ConfigError::Invalid {
            key: "AUTOU_BASE_URL",
            reason: err.to_string(),
        })?;

        let api = ApiConfig {
            base_url,
            process_path: env::var("AUTOU_PROCESS_PATH")
                .unwrap_or_else(|_| "/api/process".to_string()),
            timeout: Duration::from_millis(parse_or("HTTP_TIMEOUT_MS", 30_000u64)?),
        };

        let directories = DirectoryConfig {
            logs_dir: env::var("LOGS_DIR").unwrap_or_else(|_| "logs".to_string()),
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()),
            storage_filename: env::var("STORAGE_FILENAME")
                .unwrap_or_else(|_| "local-storage.json".to_string()),
            cache_filename: env::var("CACHE_FILENAME")
                .unwrap_or_else(|_| "offline-cache.json".to_string()),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        };

        let timezone = env::var("APP_TIMEZONE").unwrap_or_else(|_| "America/Sao_Paulo".to_string());

        let version = env::var("CACHE_VERSION").unwrap_or_else(|_| "1.0.0".to_string());
        let version = Version::parse(&version).map_err(|err| ConfigError::Invalid {
            key: "CACHE_VERSION",
            reason: err.to_string(),
        })?;

        let cache = CacheConfig {
            prefix: env::var("CACHE_PREFIX").unwrap_or_else(|_| "autou".to_string()),
            version,
            skip_waiting: parse_flag("SW_SKIP_WAITING"),
            precache: env::var("PRECACHE_URLS")
                .map(|value| {
                    value
                        .split(',')
                        .map(|part| part.trim().to_string())
                        .filter(|part| !part.is_empty())
                        .collect::<Vec<_>>()
                })
                .unwrap_or_else(|_| DEFAULT_PRECACHE.iter().map(|s| s.to_string()).collect()),
        };

        let defaults = UiConfig::default();
        let ui = UiConfig {
            debounce: parse_millis("AUTO_SUBMIT_DEBOUNCE_MS", defaults.debounce)?,
            auto_submit_min_chars: parse_or(
                "AUTO_SUBMIT_MIN_CHARS",
                defaults.auto_submit_min_chars,
            )?,
            notification_ttl: parse_millis("NOTIFICATION_TIMEOUT_MS", defaults.notification_ttl)?,
            reset_delay: parse_millis("RESET_DELAY_MS", defaults.reset_delay)?,
        };

        Ok(Self {
            api,
            directories,
            logging,
            timezone,
            cache,
            ui,
        })
    }
}

fn parse_or<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => {
            value
                .trim()
                .parse::<T>()
                .map_err(|err| ConfigError::Invalid {
                    key,
                    reason: err.to_string(),
                })
        }
        _ => Ok(default),
    }
}

fn parse_millis(key: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    parse_or(key, default.as_millis() as u64).map(Duration::from_millis)
}

fn parse_flag(key: &str) -> bool {
    env::var(key)
        .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}
