//! Pool-Indexer main entry point
//!
//! This is the command-line interface for the Pool-Indexer package crawler.

use anyhow::{Context, Result};
use clap::Parser;
use pool_indexer::config::{load_config_with_hash, Config};
use pool_indexer::crawler::{Coordinator, CrawlReport};
use pool_indexer::output::{print_statistics, JsonOutput, OutputHandler, SqliteOutput};
use pool_indexer::storage::SqliteStorage;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Pool-Indexer: a package metadata indexer for directory-listing mirrors
///
/// Pool-Indexer walks `pool/<component>/<bucket>/<package>/<version>/`
/// listings and records where each package version keeps its copyright
/// and changelog files.
#[derive(Parser, Debug)]
#[command(name = "pool-indexer")]
#[command(version = "1.0.0")]
#[command(about = "A package metadata indexer for directory-listing mirrors", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Write the JSON records here instead of the configured json-path
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let json_path = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.json_path));

    if cli.dry_run {
        handle_dry_run(&config, &json_path);
        return Ok(());
    }

    let report = handle_crawl(&config).await?;
    write_outputs(&config, &config_hash, &json_path, &report)?;

    if !cli.quiet {
        print_statistics(&report.stats);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pool_indexer=info,warn"),
            1 => EnvFilter::new("pool_indexer=debug,info"),
            2 => EnvFilter::new("pool_indexer=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config, json_path: &Path) {
    println!("=== Pool-Indexer Dry Run ===\n");

    println!("Crawler Configuration:");
    println!(
        "  Max concurrent requests: {}",
        config.crawler.max_concurrent_requests
    );
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Max nodes: {}", config.crawler.max_nodes);
    println!("  Anchor segment: {}", config.crawler.anchor_segment);

    println!("\nFetch:");
    println!("  Request timeout: {}ms", config.fetch.request_timeout_ms);
    println!("  Connect timeout: {}ms", config.fetch.connect_timeout_ms);
    println!("  Max retries: {}", config.fetch.max_retries);
    println!(
        "  Backoff: {}ms doubling, capped at {}ms",
        config.fetch.backoff_base_ms, config.fetch.max_backoff_ms
    );

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  JSON: {}", json_path.display());
    match &config.output.database_path {
        Some(path) => println!("  Database: {}", path),
        None => println!("  Database: (disabled)"),
    }

    println!("\nRoots ({}):", config.roots.len());
    for root in &config.roots {
        println!("  - {}: {}", root.component, root.url);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling from {} roots", config.roots.len());
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config) -> Result<CrawlReport> {
    tracing::info!(
        "Roots: {}, max concurrent requests: {}",
        config.roots.len(),
        config.crawler.max_concurrent_requests
    );

    let coordinator = Coordinator::new(config).context("Failed to initialize crawler")?;

    let token = coordinator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping crawl and keeping partial results");
            token.cancel();
        }
    });

    Ok(coordinator.run().await)
}

/// Writes the JSON records and, when configured, the SQLite export
fn write_outputs(
    config: &Config,
    config_hash: &str,
    json_path: &Path,
    report: &CrawlReport,
) -> Result<()> {
    JsonOutput::new(json_path)
        .write_report(report)
        .with_context(|| format!("Failed to write {}", json_path.display()))?;

    if let Some(database_path) = &config.output.database_path {
        let storage = SqliteStorage::new(Path::new(database_path))
            .with_context(|| format!("Failed to open database {}", database_path))?;
        SqliteOutput::new(storage, config_hash)
            .write_report(report)
            .with_context(|| format!("Failed to export to {}", database_path))?;
    }

    Ok(())
}
