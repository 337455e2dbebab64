//! Client configuration parsed from environment variables.
//!
//! SYSTEM CONTEXT
//! ==============
//! The binary loads `.env` via `dotenvy`, then builds a `ClientConfig` here.
//! CLI flags layered on top by clap take precedence over the environment.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_NAV_DELAY_MS: u64 = 500;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

const STATE_DIR_NAME: &str = "sentiboard";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid API URL '{0}' (expected http:// or https://)")]
    InvalidApiUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server origin without the `/api` prefix and without a trailing slash.
    pub api_url: String,
    pub state_dir: PathBuf,
    pub download_dir: PathBuf,
    pub nav_delay: Duration,
    pub timeouts: Timeouts,
}

impl ClientConfig {
    /// Build a config for `api_url` with every other field at its default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiUrl`] if the URL has no http(s) scheme.
    pub fn new(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: normalize_api_url(api_url)?,
            state_dir: default_state_dir(),
            download_dir: PathBuf::from("."),
            nav_delay: Duration::from_millis(DEFAULT_NAV_DELAY_MS),
            timeouts: Timeouts::default(),
        })
    }

    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `SENTIBOARD_API_URL`: default `http://127.0.0.1:8000`
    /// - `SENTIBOARD_STATE_DIR`: default `<data dir>/sentiboard`
    /// - `SENTIBOARD_DOWNLOAD_DIR`: default current directory
    /// - `SENTIBOARD_NAV_DELAY_MS`: default 500
    /// - `SENTIBOARD_REQUEST_TIMEOUT_SECS`: default 30
    /// - `SENTIBOARD_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiUrl`] if `SENTIBOARD_API_URL` is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = std::env::var("SENTIBOARD_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_owned());
        let mut config = Self::new(&api_url)?;
        if let Ok(dir) = std::env::var("SENTIBOARD_STATE_DIR") {
            config.state_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("SENTIBOARD_DOWNLOAD_DIR") {
            config.download_dir = PathBuf::from(dir);
        }
        config.nav_delay = Duration::from_millis(env_parse_u64("SENTIBOARD_NAV_DELAY_MS", DEFAULT_NAV_DELAY_MS));
        config.timeouts = Timeouts {
            request_secs: env_parse_u64("SENTIBOARD_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("SENTIBOARD_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        Ok(config)
    }
}

/// Trim trailing slashes and require an http(s) scheme.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidApiUrl`] for anything else.
pub fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let has_host = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .is_some_and(|rest| !rest.is_empty());
    if has_host { Ok(trimmed.to_owned()) } else { Err(ConfigError::InvalidApiUrl(raw.to_owned())) }
}

fn default_state_dir() -> PathBuf {
    dirs::data_dir().map_or_else(|| PathBuf::from(".sentiboard"), |dir| dir.join(STATE_DIR_NAME))
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}
