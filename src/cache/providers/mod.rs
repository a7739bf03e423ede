#[cfg(feature = "cache-redis")]
pub mod redis;

#[cfg(feature = "cache-moka")]
pub mod moka;

#[cfg(feature = "cache-redis")]
pub use self::redis::RedisCacheService;

#[cfg(feature = "cache-moka")]
pub use self::moka::MokaCacheService;
