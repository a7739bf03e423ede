//! # Batch Fetch Engine
//!
//! Windowed, bounded-concurrency fetching with cache-aside short-circuiting.
//!
//! ```text
//! FetchEngine::run(ids)
//!   └── BatchScheduler        windows of `window_size`, strictly sequential
//!         ├── deduplicate     per window
//!         └── WindowCoordinator
//!               ├── CacheProvider::get      hit -> result, no fetch
//!               ├── tokio::spawn(Fetcher)   miss -> one task per identifier
//!               ├── join_all                window barrier
//!               └── CacheProvider::set      success only, outside the lock
//! ```
//!
//! The engine never fails because of a single identifier: every outcome is
//! recorded in the returned [`RunMetadata`].

pub mod aggregator;
pub mod backoff;
pub mod coordinator;
pub mod dedup;
pub mod scheduler;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub use aggregator::{RunMetadata, RunTally};
pub use backoff::WindowBackoff;
pub use coordinator::{RunState, WindowCoordinator, WindowReport};
pub use dedup::{deduplicate, Deduplicated};
pub use scheduler::BatchScheduler;

use crate::cache::CacheProvider;
use crate::config::{BackoffConfig, BatchFetchConfig, ConfigurationError};
use crate::constants::{
    DEFAULT_CACHE_TTL_SECONDS, DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_WINDOW_SIZE,
};
use crate::error::Result;
use crate::fetch::{Fetcher, HttpFetcher, HttpFetcherConfig};

/// Tuning knobs for one engine
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOptions {
    pub window_size: usize,
    pub cache_ttl: Duration,
    pub request_timeout: Duration,
    pub backoff: BackoffConfig,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECONDS),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            backoff: BackoffConfig::default(),
        }
    }
}

impl EngineOptions {
    pub fn from_config(config: &BatchFetchConfig) -> Self {
        Self {
            window_size: config.fetch.window_size,
            cache_ttl: config.cache.ttl(),
            request_timeout: config.fetch.request_timeout(),
            backoff: config.backoff.clone(),
        }
    }
}

/// What a run hands back to its caller
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// identifier -> payload for every success and cache hit
    pub results: HashMap<String, String>,
    pub metadata: RunMetadata,
}

/// Entry point for batch runs
#[derive(Debug, Clone)]
pub struct FetchEngine {
    scheduler: BatchScheduler,
    cache: Arc<CacheProvider>,
}

impl FetchEngine {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        cache: CacheProvider,
        options: EngineOptions,
    ) -> Result<Self> {
        if options.window_size == 0 {
            return Err(ConfigurationError::invalid_value(
                "fetch.window_size",
                "0",
                "window size must be at least 1",
            )
            .into());
        }
        if options.request_timeout.is_zero() {
            return Err(ConfigurationError::invalid_value(
                "fetch.request_timeout_ms",
                "0",
                "request timeout must be positive",
            )
            .into());
        }

        let cache = Arc::new(cache);
        let coordinator = WindowCoordinator::new(
            fetcher,
            Arc::clone(&cache),
            options.cache_ttl,
            options.request_timeout,
        );
        let scheduler = BatchScheduler::new(coordinator, options.window_size, options.backoff);

        Ok(Self { scheduler, cache })
    }

    /// Build an engine backed by the HTTP fetcher described in `config`
    pub fn from_config(config: &BatchFetchConfig, cache: CacheProvider) -> Result<Self> {
        let fetcher = HttpFetcher::new(HttpFetcherConfig::from_fetch_config(&config.fetch))?;
        Self::new(Arc::new(fetcher), cache, EngineOptions::from_config(config))
    }

    pub fn cache(&self) -> &CacheProvider {
        &self.cache
    }

    pub fn window_size(&self) -> usize {
        self.scheduler.window_size()
    }

    /// Process every identifier. Per-identifier failures are recorded, never returned.
    pub async fn run(&self, ids: &[String]) -> RunOutput {
        self.scheduler.run(ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BatchFetchError;
    use crate::fetch::FetchOutcome;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct EchoFetcher;

    #[async_trait]
    impl Fetcher for EchoFetcher {
        async fn fetch(&self, identifier: &str) -> FetchOutcome {
            FetchOutcome::Success(identifier.to_uppercase())
        }
    }

    #[test]
    fn test_zero_window_is_rejected() {
        let result = FetchEngine::new(
            Arc::new(EchoFetcher),
            CacheProvider::disabled(),
            EngineOptions {
                window_size: 0,
                ..EngineOptions::default()
            },
        );
        assert!(matches!(result, Err(BatchFetchError::Configuration(_))));
    }

    #[test]
    fn test_options_from_config() {
        let mut config = BatchFetchConfig::default();
        config.fetch.window_size = 7;
        config.cache.ttl_seconds = 30;

        let options = EngineOptions::from_config(&config);
        assert_eq!(options.window_size, 7);
        assert_eq!(options.cache_ttl, Duration::from_secs(30));
        assert_eq!(options.backoff, BackoffConfig::default());
    }

    #[tokio::test]
    async fn test_run_collects_results() {
        let engine = FetchEngine::new(
            Arc::new(EchoFetcher),
            CacheProvider::disabled(),
            EngineOptions::default(),
        )
        .unwrap();
        let ids: Vec<String> = ["a", "b", "a"].iter().map(|s| s.to_string()).collect();

        let output = engine.run(&ids).await;
        assert_eq!(output.results.len(), 2);
        assert_eq!(output.results["a"], "A");
        assert_eq!(output.metadata.duplicate_ids_count, 1);
        assert!(output.metadata.is_balanced());
    }
}
