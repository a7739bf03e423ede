//! # Batch Fetch Configuration
//!
//! Every section has defaults matching the observed deployment (window of five,
//! 24 minute cache TTL, Redis on localhost), so an empty configuration file is valid.
//! Values are layered by [`ConfigLoader`]: defaults, then an optional TOML file, then
//! `BATCHFETCH__SECTION__FIELD` environment overrides.
//!
//! ```toml
//! [fetch]
//! base_url = "https://challenges.qluv.io/items/"
//! window_size = 5
//!
//! [cache]
//! backend = "redis"
//! ttl_seconds = 1440
//!
//! [cache.redis]
//! url = "redis://localhost:6379"
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::constants;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BatchFetchConfig {
    /// Remote resource and admission control
    pub fetch: FetchConfig,

    /// Cache-aside store
    pub cache: CacheConfig,

    /// Optional delay between windows after rate limiting
    pub backoff: BackoffConfig,

    /// Identifier source and result sinks
    pub io: IoConfig,
}

impl BatchFetchConfig {
    /// Reject values the engine cannot run with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.fetch.base_url.trim().is_empty() {
            return Err(ConfigurationError::invalid_value(
                "fetch.base_url",
                &self.fetch.base_url,
                "base URL must not be empty",
            ));
        }
        if self.fetch.window_size == 0 {
            return Err(ConfigurationError::invalid_value(
                "fetch.window_size",
                self.fetch.window_size,
                "window size must be at least 1",
            ));
        }
        if self.fetch.request_timeout_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "fetch.request_timeout_ms",
                self.fetch.request_timeout_ms,
                "request timeout must be positive",
            ));
        }
        if self.cache.ttl_seconds == 0 {
            return Err(ConfigurationError::invalid_value(
                "cache.ttl_seconds",
                self.cache.ttl_seconds,
                "cache TTL must be positive",
            ));
        }
        if self.cache.operation_timeout_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "cache.operation_timeout_ms",
                self.cache.operation_timeout_ms,
                "cache operation timeout must be positive",
            ));
        }
        if self.backoff.min_delay_ms > self.backoff.max_delay_ms {
            return Err(ConfigurationError::validation_error(format!(
                "backoff.min_delay_ms ({}) exceeds backoff.max_delay_ms ({})",
                self.backoff.min_delay_ms, self.backoff.max_delay_ms
            )));
        }
        if self.io.delimiter.is_empty() {
            return Err(ConfigurationError::invalid_value(
                "io.delimiter",
                "",
                "delimiter must not be empty",
            ));
        }
        Ok(())
    }
}

/// Remote resource configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Identifier is appended verbatim to this address
    pub base_url: String,
    /// Value of the `Authorization` header
    pub auth_token: String,
    /// Maximum number of concurrent requests (one window)
    pub window_size: usize,
    pub request_timeout_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: constants::DEFAULT_BASE_URL.to_string(),
            auth_token: String::new(),
            window_size: constants::DEFAULT_WINDOW_SIZE,
            request_timeout_ms: constants::DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl FetchConfig {
    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Cache-aside configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// One of `redis`, `moka` (aliases `memory`, `in-memory`) or `disabled`
    pub backend: String,
    pub ttl_seconds: u64,
    /// Upper bound on a single cache `get` or `set`
    pub operation_timeout_ms: u64,
    pub redis: Option<RedisConfig>,
    pub moka: Option<MokaConfig>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: "redis".to_string(),
            ttl_seconds: constants::DEFAULT_CACHE_TTL_SECONDS,
            operation_timeout_ms: constants::DEFAULT_CACHE_OPERATION_TIMEOUT_MS,
            redis: Some(RedisConfig::default()),
            moka: None,
        }
    }
}

impl CacheConfig {
    /// Get entry time-to-live as Duration
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RedisConfig {
    pub url: String,
    pub connection_timeout_seconds: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: constants::DEFAULT_REDIS_URL.to_string(),
            connection_timeout_seconds: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MokaConfig {
    pub max_capacity: u64,
}

impl Default for MokaConfig {
    fn default() -> Self {
        Self {
            max_capacity: constants::DEFAULT_MOKA_MAX_CAPACITY,
        }
    }
}

/// Backoff applied between windows when the previous window saw 429 responses
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BackoffConfig {
    pub enabled: bool,
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    pub factor: f32,
    /// Consecutive rate-limited windows after which the delay stops growing
    pub max_times: usize,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_delay_ms: constants::backoff::DEFAULT_MIN_DELAY_MS,
            max_delay_ms: constants::backoff::DEFAULT_MAX_DELAY_MS,
            factor: constants::backoff::DEFAULT_FACTOR,
            max_times: constants::backoff::DEFAULT_MAX_TIMES,
        }
    }
}

impl BackoffConfig {
    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

/// Identifier source and sink locations
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct IoConfig {
    pub input_path: PathBuf,
    pub delimiter: String,
    pub output_path: PathBuf,
    pub metadata_path: PathBuf,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(constants::DEFAULT_INPUT_PATH),
            delimiter: constants::DEFAULT_ID_DELIMITER.to_string(),
            output_path: PathBuf::from(constants::DEFAULT_OUTPUT_PATH),
            metadata_path: PathBuf::from(constants::DEFAULT_METADATA_PATH),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_observed_deployment() {
        let config = BatchFetchConfig::default();
        assert_eq!(config.fetch.window_size, 5);
        assert_eq!(config.cache.ttl(), Duration::from_secs(1440));
        assert_eq!(config.cache.backend, "redis");
        assert!(!config.backoff.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_window_rejected() {
        let mut config = BatchFetchConfig::default();
        config.fetch.window_size = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("fetch.window_size"));
    }

    #[test]
    fn test_inverted_backoff_bounds_rejected() {
        let mut config = BatchFetchConfig::default();
        config.backoff.min_delay_ms = 10_000;
        config.backoff.max_delay_ms = 1_000;
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_zero_cache_operation_timeout_rejected() {
        let mut config = BatchFetchConfig::default();
        config.cache.operation_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("cache.operation_timeout_ms"));
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let mut config = BatchFetchConfig::default();
        config.fetch.base_url = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
