//! Configuration management for Meetlist
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{MeetlistError, Result};
use crate::session::Window;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for Meetlist
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote session service settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Rendering settings
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Remote session service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the REST API; `/sessions` is appended to it
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Retry policy for transport errors and 5xx responses
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
            retry: RetryConfig::default(),
        }
    }
}

/// Bounded retry policy
///
/// `max_attempts` counts the first try, so the default of 1 never retries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay between attempts (milliseconds)
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

fn default_max_attempts() -> u32 {
    1
}

fn default_backoff_ms() -> u64 {
    500
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

/// Rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Window used by `sessions list` when `--window` is not given
    #[serde(default)]
    pub default_window: Window,

    /// Seconds before error and success banners auto-clear (0 = never)
    #[serde(default = "default_banner_ttl")]
    pub banner_ttl_seconds: u64,

    /// chrono format string for start times in tables
    #[serde(default = "default_time_format")]
    pub time_format: String,
}

fn default_banner_ttl() -> u64 {
    3
}

fn default_time_format() -> String {
    "%Y-%m-%d %H:%M".to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            default_window: Window::default(),
            banner_ttl_seconds: default_banner_ttl(),
            time_format: default_time_format(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| MeetlistError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| MeetlistError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("MEETLIST_API_URL") {
            tracing::debug!(base_url = %base_url, "Env override: MEETLIST_API_URL");
            self.api.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("MEETLIST_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.api.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid MEETLIST_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(attempts) = std::env::var("MEETLIST_RETRY_MAX_ATTEMPTS") {
            match attempts.parse::<u32>() {
                Ok(v) => {
                    self.api.retry.max_attempts = v;
                    tracing::debug!(max_attempts = v, "Env override: MEETLIST_RETRY_MAX_ATTEMPTS");
                }
                Err(_) => {
                    tracing::warn!("Invalid value for MEETLIST_RETRY_MAX_ATTEMPTS: {}", attempts);
                }
            }
        }

        if let Ok(backoff) = std::env::var("MEETLIST_RETRY_BACKOFF_MS") {
            match backoff.parse::<u64>() {
                Ok(v) => {
                    self.api.retry.backoff_ms = v;
                    tracing::debug!(backoff_ms = v, "Env override: MEETLIST_RETRY_BACKOFF_MS");
                }
                Err(_) => {
                    tracing::warn!("Invalid value for MEETLIST_RETRY_BACKOFF_MS: {}", backoff);
                }
            }
        }

        if let Ok(window) = std::env::var("MEETLIST_DEFAULT_WINDOW") {
            match window.parse::<Window>() {
                Ok(w) => self.display.default_window = w,
                Err(e) => tracing::warn!("{}; keeping {}", e, self.display.default_window),
            }
        }

        if let Ok(ttl) = std::env::var("MEETLIST_BANNER_TTL_SECONDS") {
            match ttl.parse::<u64>() {
                Ok(v) => self.display.banner_ttl_seconds = v,
                Err(_) => {
                    tracing::warn!("Invalid value for MEETLIST_BANNER_TTL_SECONDS: {}", ttl);
                }
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(api_url) = &cli.api_url {
            tracing::debug!("CLI override: api.base_url={}", api_url);
            self.api.base_url = api_url.clone();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(MeetlistError::Config("api.base_url cannot be empty".to_string()).into());
        }

        let url = url::Url::parse(&self.api.base_url).map_err(|e| {
            MeetlistError::Config(format!(
                "api.base_url is not a valid URL ({}): {}",
                self.api.base_url, e
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(MeetlistError::Config(format!(
                "api.base_url must use http or https, got {}",
                url.scheme()
            ))
            .into());
        }

        if self.api.timeout_seconds == 0 {
            return Err(MeetlistError::Config(
                "api.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.api.retry.max_attempts == 0 {
            return Err(MeetlistError::Config(
                "api.retry.max_attempts must be greater than 0".to_string(),
            )
            .into());
        }

        if self.api.retry.max_attempts > 10 {
            return Err(MeetlistError::Config(
                "api.retry.max_attempts must be less than or equal to 10".to_string(),
            )
            .into());
        }

        if StrftimeItems::new(&self.display.time_format).any(|item| matches!(item, Item::Error)) {
            return Err(MeetlistError::Config(format!(
                "display.time_format is not a valid chrono format: {}",
                self.display.time_format
            ))
            .into());
        }

        Ok(())
    }
}
