//! The gateway the window coordinator talks to.
//!
//! Every `get` and `set` is bounded by the operation timeout, so a stalled backend
//! costs one timeout per call instead of holding up a window barrier.

use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

use super::errors::{CacheError, CacheResult};
use crate::config::CacheConfig;
use crate::constants::DEFAULT_CACHE_OPERATION_TIMEOUT_MS;

#[cfg(feature = "cache-redis")]
use super::providers::RedisCacheService;

#[cfg(feature = "cache-moka")]
use super::providers::MokaCacheService;

#[derive(Debug, Clone)]
enum Backend {
    #[cfg(feature = "cache-redis")]
    Redis(RedisCacheService),
    #[cfg(feature = "cache-moka")]
    Memory(MokaCacheService),
    /// Every lookup misses and every write is dropped
    Disabled,
    #[cfg(test)]
    Faulty(testing::Fault),
}

#[derive(Debug, Clone)]
pub struct CacheProvider {
    backend: Backend,
    operation_timeout: Duration,
}

impl CacheProvider {
    fn with_backend(backend: Backend) -> Self {
        Self {
            backend,
            operation_timeout: Duration::from_millis(DEFAULT_CACHE_OPERATION_TIMEOUT_MS),
        }
    }

    /// Build the configured backend. An unreachable or unknown backend yields a
    /// disabled gateway with a warning; a run never fails because of the cache.
    pub async fn from_config_graceful(config: &CacheConfig) -> Self {
        let backend = if config.enabled {
            Self::connect(config).await
        } else {
            info!("Cache disabled by configuration");
            Backend::Disabled
        };

        Self {
            backend,
            operation_timeout: config.operation_timeout(),
        }
    }

    async fn connect(config: &CacheConfig) -> Backend {
        match config.backend.as_str() {
            "redis" =>Self::connect_redis(config).await,
            "moka" | "memory" | "in-memory" => Self::connect_memory(config),
            "noop" | "none" | "disabled" => Backend::Disabled,
            other => {
                warn!(backend = other, "Unknown cache backend, caching disabled");
                Backend::Disabled
            }
        }
    }

    #[cfg(feature = "cache-redis")]
    async fn connect_redis(config: &CacheConfig) -> Backend {
        let redis_config = config.redis.clone().unwrap_or_default();
        match RedisCacheService::connect(&redis_config).await {
            Ok(redis) => {
                info!(cache = ?redis, "Using Redis cache");
                Backend::Redis(redis)
            }
            Err(e) => {
                warn!(error = %e, "Redis unreachable, caching disabled for this run");
                Backend::Disabled
            }
        }
    }

    #[cfg(not(feature = "cache-redis"))]
    async fn connect_redis(_config: &CacheConfig) -> Backend {
        warn!("Built without the cache-redis feature, caching disabled");
        Backend::Disabled
    }

    #[cfg(feature = "cache-moka")]
    fn connect_memory(config: &CacheConfig) -> Backend {
        let moka_config = config.moka.clone().unwrap_or_default();
        info!(max_capacity = moka_config.max_capacity, "Using in-process cache");
        Backend::Memory(MokaCacheService::from_config(&moka_config))
    }

    #[cfg(not(feature = "cache-moka"))]
    fn connect_memory(_config: &CacheConfig) -> Backend {
        warn!("Built without the cache-moka feature, caching disabled");
        Backend::Disabled
    }

    pub fn disabled() -> Self {
        Self::with_backend(Backend::Disabled)
    }

    #[cfg(feature = "cache-moka")]
    pub fn in_memory(max_capacity: u64) -> Self {
        Self::with_backend(Backend::Memory(MokaCacheService::new(max_capacity)))
    }

    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// False when lookups can never hit
    pub fn is_enabled(&self) -> bool {
        !matches!(self.backend, Backend::Disabled)
    }

    pub fn provider_name(&self) -> &'static str {
        match self.backend {
            #[cfg(feature = "cache-redis")]
            Backend::Redis(_) => "redis",
            #[cfg(feature = "cache-moka")]
            Backend::Memory(_) => "moka",
            Backend::Disabled => "disabled",
            #[cfg(test)]
            Backend::Faulty(_) => "faulty",
        }
    }

    /// `Ok(None)` is a miss
    pub async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.bounded("get", async {
            match &self.backend {
                #[cfg(feature = "cache-redis")]
                Backend::Redis(redis) => redis.get(key).await,
                #[cfg(feature = "cache-moka")]
                Backend::Memory(memory) => Ok(memory.get(key).await),
                Backend::Disabled => Ok(None),
                #[cfg(test)]
                Backend::Faulty(fault) => fault.get().await,
            }
        })
        .await
    }

    /// Store `payload` under `key` until `ttl` elapses
    pub async fn set(&self, key: &str, payload: &str, ttl: Duration) -> CacheResult<()> {
        self.bounded("set", async {
            match &self.backend {
                #[cfg(feature = "cache-redis")]
                Backend::Redis(redis) => redis.set(key, payload, ttl).await,
                #[cfg(feature = "cache-moka")]
                Backend::Memory(memory) => {
                    memory.set(key, payload, ttl).await;
                    Ok(())
                }
                Backend::Disabled => Ok(()),
                #[cfg(test)]
                Backend::Faulty(fault) => fault.set().await,
            }
        })
        .await
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = CacheResult<T>>,
    ) -> CacheResult<T> {
        match tokio::time::timeout(self.operation_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(CacheError::Timeout {
                operation,
                after: self.operation_timeout,
            }),
        }
    }
}
