//! Shelf-Trawl main entry point
//!
//! This is the command-line interface for the Shelf-Trawl catalog crawler.

use anyhow::Context;
use clap::Parser;
use shelf_trawl::config::{load_config_with_hash, Config};
use shelf_trawl::crawler::run_crawl;
use shelf_trawl::etl::run_etl;
use shelf_trawl::storage::{open_store, RecordStore};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Shelf-Trawl: A polite catalog crawler
///
/// Shelf-Trawl checks robots.txt, walks every category of a paginated
/// catalog, stores the raw item records and writes a cleaned CSV file.
#[derive(Parser, Debug)]
#[command(name = "shelf-trawl")]
#[command(version = "1.0.0")]
#[command(about = "A polite catalog crawler", long_about = None)]
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

    /// Also write logs to this file (no colors)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "etl_only")]
    dry_run: bool,

    /// Only run the cleaning stage against the stored raw records
    #[arg(long, conflicts_with_all = ["dry_run", "skip_etl"])]
    etl_only: bool,

    /// Crawl and store raw records, but do not run the cleaning stage
    #[arg(long)]
    skip_etl: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Keep the guard alive so the file writer flushes on exit
    let _guard = match setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let mut store =
        open_store(&config.output, &config_hash).context("failed to open record store")?;

    if !cli.etl_only {
        handle_crawl(&config, store.as_mut()).await?;
    }

    if cli.skip_etl {
        tracing::info!("Skipping cleaning stage");
    } else {
        handle_etl(&config, store.as_ref())?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Returns the file writer's guard when `log_file` is set.
fn setup_logging(
    verbose: u8,
    quiet: bool,
    log_file: Option<&Path>,
) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shelf_trawl=info,warn"),
            1 => EnvFilter::new("shelf_trawl=debug,info"),
            2 => EnvFilter::new("shelf_trawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .with_context(|| format!("log file path has no file name: {}", path.display()))?;
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;

            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_target(false)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Shelf-Trawl Dry Run ===\n");

    println!("Target:");
    println!("  Base URL: {}", config.target.base_url);

    println!("\nFetching:");
    println!("  Max retries: {}", config.fetch.max_retries);
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!("  Backoff base: {}ms", config.fetch.backoff_base_ms);
    println!("  Proxy: {}", config.fetch.proxy.as_deref().unwrap_or("none"));
    println!("  User agents ({}):", config.fetch.user_agents.len());
    for agent in &config.fetch.user_agents {
        println!("    * {}", agent);
    }

    println!("\nRobots:");
    println!("  Evaluated as: {}", config.robots.user_agent);

    println!("\nCrawler:");
    println!(
        "  Max concurrent categories: {}",
        config.crawler.max_concurrent_categories
    );

    println!("\nOutput:");
    println!("  Sink: {:?}", config.output.sink);
    println!("  Raw records: {}", config.output.raw_path);
    println!("  Database: {}", config.output.database_path);
    println!("  Processed: {}", config.output.processed_path);

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, store: &mut dyn RecordStore) -> anyhow::Result<()> {
    let report = run_crawl(config, store).await.context("crawl failed")?;

    for tally in &report.categories {
        tracing::debug!("{}: {} records", tally.name, tally.records);
    }

    println!("Total records scraped: {}", report.total_records);
    println!("Raw records saved to: {}", report.destination);
    Ok(())
}

/// Handles the cleaning stage
fn handle_etl(config: &Config, store: &dyn RecordStore) -> anyhow::Result<()> {
    let processed = Path::new(&config.output.processed_path);
    let rows = run_etl(store, processed).context("cleaning stage failed")?;

    println!("Cleaned {} records into {}", rows, processed.display());
    Ok(())
}
