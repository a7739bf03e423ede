//! In-process backend. Entries outlive a single engine run but not the process.

use moka::future::Cache;
use moka::Expiry;
use std::time::{Duration, Instant};

use crate::config::MokaConfig;

/// A payload together with the TTL it was written with
#[derive(Debug, Clone)]
struct Entry {
    payload: String,
    ttl: Duration,
}

/// Expires each entry after the TTL passed to its own `set`
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

#[derive(Clone)]
pub struct MokaCacheService {
    entries: Cache<String, Entry>,
}

impl std::fmt::Debug for MokaCacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaCacheService")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

impl MokaCacheService {
    pub fn new(max_capacity: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();
        Self { entries }
    }

    pub fn from_config(config: &MokaConfig) -> Self {
        Self::new(config.max_capacity)
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).await.map(|entry| entry.payload)
    }

    pub async fn set(&self, key: &str, payload: &str, ttl: Duration) {
        let entry = Entry {
            payload: payload.to_string(),
            ttl,
        };
        self.entries.insert(key.to_string(), entry).await;
    }
}
