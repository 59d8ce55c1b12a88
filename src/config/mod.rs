use std::env;
use std::time::Duration;

use reqwest::Url;

use crate::utils::error::{AppError, Result};

const DEFAULT_API_URL: &str = "http://localhost:8080/";
const DEFAULT_DATABASE_URL: &str = "sqlite://ludico.db?mode=rwc";
const DEFAULT_SYNC_INTERVAL_SECS: u64 = 3600;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: Url,
    pub database_url: String,
    pub sync_interval: Duration,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let api_url =
            env::var("LUDICO_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        Ok(Self {
            api_url: parse_base_url(&api_url)?,
            database_url: env::var("LUDICO_DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            sync_interval: Duration::from_secs(secs_from_env(
                "LUDICO_SYNC_INTERVAL_SECS",
                DEFAULT_SYNC_INTERVAL_SECS,
            )),
            http_timeout: Duration::from_secs(secs_from_env(
                "LUDICO_HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            sync_interval: Duration::from_secs(DEFAULT_SYNC_INTERVAL_SECS),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

/// Parses the backend base URL. Endpoint paths are joined relative to it,
/// so the path always ends with a slash.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };

    Url::parse(&with_slash)
        .map_err(|e| AppError::ValidationError(format!("Invalid API URL '{}': {}", trimmed, e)))
}

fn secs_from_env(key: &str, default: u64) -> u64 {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(0) | Err(_) => {
                tracing::warn!("Config: invalid value '{}' for {}, using {}", raw, key, default);
                default
            }
            Ok(value) => value,
        },
        Err(_) => default,
    }
}
