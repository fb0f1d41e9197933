//! Configuration module for ManageMe.

use serde::Deserialize;
use std::path::Path;

use crate::{ManageMeError, Result};

/// API endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the ManageMe API server (e.g. "http://localhost:8888").
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Read timeout in seconds.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
    /// Total request timeout in seconds.
    #[serde(default = "default_total_timeout")]
    pub total_timeout_secs: u64,
    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "http://localhost:8888".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_read_timeout() -> u64 {
    20
}

fn default_total_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("ManageMe-Client/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
            total_timeout_secs: default_total_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Client behaviour configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Timezone of the local wall clock (e.g., "Asia/Tokyo", "UTC").
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Length of a freshly created task draft in seconds.
    #[serde(default = "default_draft_duration")]
    pub draft_duration_secs: i64,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_draft_duration() -> i64 {
    3600
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            draft_duration_secs: default_draft_duration(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/manageme.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// API configuration.
    #[serde(default)]
    pub api: ApiConfig,
    /// Client configuration.
    #[serde(default)]
    pub client: ClientConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ManageMeError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ManageMeError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `MANAGEME_API_URL`: Override the API base URL
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("MANAGEME_API_URL") {
            if !url.is_empty() {
                self.api.base_url = url;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - the API base URL is not an absolute http(s) URL
    /// - the client timezone is unknown
    /// - the draft duration is not positive
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.api.base_url).map_err(|e| {
            ManageMeError::Config(format!("invalid api.base_url {:?}: {e}", self.api.base_url))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ManageMeError::Config(format!(
                "api.base_url must use http or https, got {}",
                url.scheme()
            )));
        }

        if self.client.timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(ManageMeError::Config(format!(
                "unknown client.timezone: {}",
                self.client.timezone
            )));
        }

        if self.client.draft_duration_secs <= 0 {
            return Err(ManageMeError::Config(
                "client.draft_duration_secs must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
