//! # batchfetch
//!
//! Command-line entry point: run a batch against the configured remote resource, or
//! generate an identifier fixture file.

use anyhow::Context;
use batchfetch_core::cache::CacheProvider;
use batchfetch_core::config::{BatchFetchConfig, ConfigLoader};
use batchfetch_core::engine::FetchEngine;
use batchfetch_core::io;
use batchfetch_core::logging::{init_structured_logging, log_error};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

#[derive(Parser)]
#[command(name = "batchfetch")]
#[command(about = "Batched concurrent fetching with cache-aside short-circuiting")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// TOML configuration file (falls back to BATCHFETCH_CONFIG_PATH)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch every identifier in the input file
    Run {
        /// Identifier file
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Result document
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Run metadata document
        #[arg(short, long)]
        metadata: Option<PathBuf>,

        /// Identifiers fetched concurrently per window
        #[arg(short, long)]
        window_size: Option<usize>,
    },

    /// Write a file of random identifiers
    Generate {
        /// Number of identifiers
        #[arg(short = 'n', long, default_value_t = 100)]
        count: usize,

        /// Destination file (defaults to the configured input path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_structured_logging();

    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_path(path),
        None => ConfigLoader::load_from_env(),
    }
    .context("failed to load configuration")?;

    let result = match cli.command {
        Commands::Run {
            input,
            output,
            metadata,
            window_size,
        } => run(config, input, output, metadata, window_size).await,
        Commands::Generate { count, output } => generate(&config, count, output).await,
    };

    if let Err(e) = &result {
        log_error("cli", "main", &format!("{e:#}"), None);
    }
    result
}

async fn run(
    mut config: BatchFetchConfig,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    metadata: Option<PathBuf>,
    window_size: Option<usize>,
) -> anyhow::Result<()> {
    if let Some(path) = input {
        config.io.input_path = path;
    }
    if let Some(path) = output {
        config.io.output_path = path;
    }
    if let Some(path) = metadata {
        config.io.metadata_path = path;
    }
    if let Some(size) = window_size {
        config.fetch.window_size = size;
    }
    config.validate().context("invalid configuration")?;

    let ids = io::read_identifiers(&config.io.input_path, &config.io.delimiter)
        .await
        .with_context(|| format!("failed to read {}", config.io.input_path.display()))?;

    let cache = CacheProvider::from_config_graceful(&config.cache).await;
    if config.cache.enabled && !cache.is_enabled() {
        eprintln!(
            "warning: cache backend '{}' unavailable, every identifier will be fetched live",
            config.cache.backend
        );
    }
    let engine = FetchEngine::from_config(&config, cache)?;

    info!(
        total_ids = ids.len(),
        window_size = engine.window_size(),
        cache = engine.cache().provider_name(),
        "Starting run"
    );

    let started = Instant::now();
    let mut output = engine.run(&ids).await;
    output.metadata.record_elapsed(started.elapsed());

    let (results_written, metadata_written) = tokio::join!(
        io::write_results(&config.io.output_path, &output.results),
        io::write_metadata(&config.io.metadata_path, &output.metadata),
    );
    results_written
        .with_context(|| format!("failed to write {}", config.io.output_path.display()))?;
    metadata_written
        .with_context(|| format!("failed to write {}", config.io.metadata_path.display()))?;

    let summary = &output.metadata;
    println!(
        "Processed {} identifiers: {} fetched, {} from cache, {} failed ({} rate limited), {} duplicates in {}",
        summary.total_ids_count,
        summary.number_of_successful_ids,
        summary.cache_hits,
        summary.number_of_failed_ids,
        summary.count_429,
        summary.duplicate_ids_count,
        summary.total_response_time.as_deref().unwrap_or("-"),
    );

    Ok(())
}

async fn generate(
    config: &BatchFetchConfig,
    count: usize,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let path = output.unwrap_or_else(|| config.io.input_path.clone());
    let ids = io::generate_identifiers(count);
    io::write_identifiers(&path, &ids, &config.io.delimiter)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!("Wrote {} identifiers to {}", ids.len(), path.display());
    Ok(())
}
