//! Configuration Loader
//!
//! Layers configuration with the `config` crate:
//! 0. Loads a `.env` file if present (via dotenvy)
//! 1. Starts from [`BatchFetchConfig::default`] (every section is `#[serde(default)]`)
//! 2. Merges an optional TOML file
//! 3. Applies `BATCHFETCH__SECTION__FIELD` environment overrides
//! 4. Validates the result

use super::error::{ConfigResult, ConfigurationError};
use super::BatchFetchConfig;
use crate::constants::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Zero-state loader; all methods are associated functions.
#[derive(Debug)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Detect environment from BATCHFETCH_ENV or default to "development"
    pub fn detect_environment() -> String {
        std::env::var(env::ENVIRONMENT).unwrap_or_else(|_| "development".to_string())
    }

    /// Load using BATCHFETCH_CONFIG_PATH when set, defaults otherwise.
    /// Environment overrides apply in both cases.
    pub fn load_from_env() -> ConfigResult<BatchFetchConfig> {
        dotenvy::dotenv().ok();

        let environment = Self::detect_environment();
        let path = std::env::var(env::CONFIG_PATH).ok().map(PathBuf::from);

        info!(
            environment = %environment,
            config_path = ?path,
            "Loading batch fetch configuration"
        );

        Self::load(path.as_deref())
    }

    /// Load a specific TOML file plus environment overrides
    pub fn load_from_path(path: &Path) -> ConfigResult<BatchFetchConfig> {
        Self::load(Some(path))
    }

    /// Load from an optional file plus environment overrides
    pub fn load(path: Option<&Path>) -> ConfigResult<BatchFetchConfig> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigurationError::load_error(
                    path.display().to_string(),
                    "file does not exist",
                ));
            }
            builder = builder.add_source(
                ::config::File::from(path)
                    .format(::config::FileFormat::Toml)
                    .required(true),
            );
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix(env::OVERRIDE_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let source_name = path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "environment".to_string());

        Self::finish(builder, &source_name)
    }

    /// Load from TOML text without consulting the process environment
    pub fn load_from_str(toml: &str) -> ConfigResult<BatchFetchConfig> {
        let builder = ::config::Config::builder()
            .add_source(::config::File::from_str(toml, ::config::FileFormat::Toml));
        Self::finish(builder, "inline")
    }

    fn finish(
        builder: ::config::ConfigBuilder<::config::builder::DefaultState>,
        source_name: &str,
    ) -> ConfigResult<BatchFetchConfig> {
        let config: BatchFetchConfig = builder
            .build()
            .and_then(|settings| settings.try_deserialize())
            .map_err(|e| ConfigurationError::load_error(source_name, e))?;

        config.validate()?;

        debug!(
            source = source_name,
            window_size = config.fetch.window_size,
            cache_backend = %config.cache.backend,
            cache_enabled = config.cache.enabled,
            backoff_enabled = config.backoff.enabled,
            "Configuration loaded and validated"
        );

        Ok(config)
    }
}
