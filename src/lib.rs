#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

//! # Batch Fetch Core
//!
//! Batched, bounded-concurrency fetching of opaque identifiers from a remote HTTP
//! resource, with cache-aside short-circuiting through Redis.
//!
//! ## Overview
//!
//! A run takes an ordered list of identifiers, splits it into fixed-size windows and
//! processes the windows strictly one after another. Inside a window, repeated
//! identifiers are dropped, cached identifiers are answered from the cache, and every
//! remaining identifier is fetched concurrently. Successful payloads are written back
//! to the cache. The run returns an identifier -> payload mapping plus metadata that
//! accounts for every input identifier exactly once.
//!
//! ## Module Organization
//!
//! - [`engine`] - Scheduler, coordinator, deduplication and run aggregation
//! - [`fetch`] - The [`fetch::Fetcher`] trait and its reqwest implementation
//! - [`cache`] - Redis and Moka cache backends behind one provider
//! - [`config`] - Layered TOML and environment configuration
//! - [`io`] - Identifier source, result and metadata sinks, fixtures
//! - [`error`] - Run-level and per-identifier error types
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use batchfetch_core::cache::CacheProvider;
//! use batchfetch_core::config::ConfigLoader;
//! use batchfetch_core::engine::FetchEngine;
//!
//! # async fn example() -> batchfetch_core::Result<()> {
//! let config = ConfigLoader::load_from_env()?;
//! let cache = CacheProvider::from_config_graceful(&config.cache).await;
//! let engine = FetchEngine::from_config(&config, cache)?;
//!
//! let ids = vec!["a".to_string(), "b".to_string()];
//! let output = engine.run(&ids).await;
//! println!("{} results, {} failed", output.results.len(), output.metadata.number_of_failed_ids);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod io;
pub mod logging;

pub use cache::{CacheError, CacheProvider};
pub use config::{BatchFetchConfig, ConfigLoader, ConfigurationError};
pub use engine::{EngineOptions, FetchEngine, RunMetadata, RunOutput};
pub use error::{BatchFetchError, FetchError, Result};
pub use fetch::{FetchOutcome, Fetcher, HttpFetcher};
