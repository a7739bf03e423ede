//! # Cache Gateway
//!
//! Cache-aside store consulted before every live fetch and written after every
//! successful one. Each entry carries the TTL it was written with.
//!
//! Backends: Redis (shared between processes and runs), Moka (in-process), or
//! disabled. Lookup errors count as misses and write errors are logged by the
//! caller; neither changes an identifier's outcome.

pub mod errors;
pub mod provider;
pub mod providers;

pub use errors::{CacheError, CacheResult};
pub use provider::CacheProvider;

#[cfg(feature = "cache-redis")]
pub use providers::RedisCacheService;

#[cfg(feature = "cache-moka")]
pub use providers::MokaCacheService;
