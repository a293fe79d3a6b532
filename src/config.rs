//! Configuration management for the fetch client.
//!
//! This module handles loading and validating configuration from environment variables,
//! optionally seeded from a `.env` file.

use crate::client::RetryPolicy;
use crate::error::{ConfigError, ConfigResult};
use std::env;
use std::time::Duration;

/// Default upstream API.
pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL that relative endpoints are joined onto
    pub base_url: String,

    /// Cache TTL in seconds (default: 300)
    pub cache_ttl_secs: u64,

    /// Per-attempt timeout in milliseconds (default: 5000)
    pub request_timeout_ms: u64,

    /// Retries after the first attempt when the caller doesn't say (default: 3)
    pub max_retries: u32,

    /// Backoff before the second attempt in milliseconds (default: 1000)
    pub backoff_base_ms: u64,

    /// Upper bound on any single backoff in milliseconds (default: 10000)
    pub backoff_cap_ms: u64,

    /// Log level (default: "error")
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// All variables are optional:
    /// - `FETCH_BASE_URL`: Base URL (default: PokéAPI v2)
    /// - `FETCH_CACHE_TTL_SECS`: Cache TTL in seconds (default: 300)
    /// - `FETCH_REQUEST_TIMEOUT_MS`: Per-attempt timeout (default: 5000)
    /// - `FETCH_MAX_RETRIES`: Default retry count (default: 3)
    /// - `FETCH_BACKOFF_BASE_MS`: Backoff base (default: 1000)
    /// - `FETCH_BACKOFF_CAP_MS`: Backoff cap (default: 10000)
    /// - `LOG_LEVEL`: Logging level (default: "error")
    pub fn from_env() -> ConfigResult<Self> {
        // A missing .env file is fine
        let _ = dotenvy::dotenv();

        let defaults = Config::default();

        let base_url = env::var("FETCH_BASE_URL").unwrap_or(defaults.base_url);
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                var: "FETCH_BASE_URL".to_string(),
                reason: "Must start with http:// or https://".to_string(),
            });
        }

        let cache_ttl_secs = Self::parse_env_u64("FETCH_CACHE_TTL_SECS", defaults.cache_ttl_secs)?;
        let request_timeout_ms =
            Self::parse_env_u64("FETCH_REQUEST_TIMEOUT_MS", defaults.request_timeout_ms)?;
        let max_retries = Self::parse_env_u32("FETCH_MAX_RETRIES", defaults.max_retries)?;
        let backoff_base_ms =
            Self::parse_env_u64("FETCH_BACKOFF_BASE_MS", defaults.backoff_base_ms)?;
        let backoff_cap_ms = Self::parse_env_u64("FETCH_BACKOFF_CAP_MS", defaults.backoff_cap_ms)?;

        if request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                var: "FETCH_REQUEST_TIMEOUT_MS".to_string(),
                reason: "Must be greater than zero".to_string(),
            });
        }

        if backoff_cap_ms < backoff_base_ms {
            return Err(ConfigError::InvalidValue {
                var: "FETCH_BACKOFF_CAP_MS".to_string(),
                reason: format!("Must be at least FETCH_BACKOFF_BASE_MS ({})", backoff_base_ms),
            });
        }

        let log_level = env::var("LOG_LEVEL").unwrap_or(defaults.log_level);

        Ok(Config {
            base_url,
            cache_ttl_secs,
            request_timeout_ms,
            max_retries,
            backoff_base_ms,
            backoff_cap_ms,
            log_level,
        })
    }

    /// Per-attempt timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Cache TTL as a `Duration`.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Backoff policy described by this configuration.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            Duration::from_millis(self.backoff_base_ms),
            Duration::from_millis(self.backoff_cap_ms),
        )
    }

    /// Parse an environment variable as u64 with a default value.
    fn parse_env_u64(var_name: &str, default: u64) -> ConfigResult<u64> {
        match env::var(var_name) {
            Ok(val) => val.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: format!("Must be a positive number, got: {}", val),
            }),
            Err(_) => Ok(default),
        }
    }

    /// Parse an environment variable as u32 with a default value.
    fn parse_env_u32(var_name: &str, default: u32) -> ConfigResult<u32> {
        match env::var(var_name) {
            Ok(val) => val.parse::<u32>().map_err(|_| ConfigError::InvalidValue {
                var: var_name.to_string(),
                reason: format!("Must be a positive number, got: {}", val),
            }),
            Err(_) => Ok(default),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_ttl_secs: 300,
            request_timeout_ms: 5000,
            max_retries: 3,
            backoff_base_ms: 1000,
            backoff_cap_ms: 10_000,
            log_level: "error".to_string(),
        }
    }
}
