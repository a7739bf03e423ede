//! # System Constants
//!
//! Defaults shared by configuration, the engine and the CLI.

/// Identifiers processed concurrently per window (the remote resource tolerates five)
pub const DEFAULT_WINDOW_SIZE: usize = 5;

/// Lifetime of a cached payload: 24 minutes
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 1440;

/// Longest a single cache lookup or write may take before it counts as failed
pub const DEFAULT_CACHE_OPERATION_TIMEOUT_MS: u64 = 2_000;

pub const DEFAULT_BASE_URL: &str = "https://challenges.qluv.io/items/";

pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";

pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

pub const DEFAULT_MOKA_MAX_CAPACITY: u64 = 10_000;

pub const DEFAULT_ID_DELIMITER: &str = ",";

pub const DEFAULT_INPUT_PATH: &str = "data/ids.txt";
pub const DEFAULT_OUTPUT_PATH: &str = "data/output.json";
pub const DEFAULT_METADATA_PATH: &str = "data/meta_data.json";

/// HTTP status the remote resource returns when too many requests are in flight
pub const RATE_LIMITED_STATUS: u16 = 429;

pub mod backoff {
    pub const DEFAULT_MIN_DELAY_MS: u64 = 500;
    pub const DEFAULT_MAX_DELAY_MS: u64 = 30_000;
    pub const DEFAULT_FACTOR: f32 = 2.0;
    pub const DEFAULT_MAX_TIMES: usize = 8;
}

pub mod env {
    pub const ENVIRONMENT: &str = "BATCHFETCH_ENV";
    pub const CONFIG_PATH: &str = "BATCHFETCH_CONFIG_PATH";
    pub const LOG_FORMAT: &str = "BATCHFETCH_LOG_FORMAT";
    /// Prefix for configuration overrides, e.g. `BATCHFETCH__FETCH__WINDOW_SIZE=10`
    pub const OVERRIDE_PREFIX: &str = "BATCHFETCH";
}
