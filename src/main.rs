//! Finn-Scout main entry point
//!
//! This is the command-line interface for the Finn-Scout listings watcher.

use anyhow::Context;
use clap::Parser;
use finn_scout::config::{load_config, Config, StoreTarget};
use finn_scout::output::{print_listings, print_run_summary, write_markdown_listings};
use finn_scout::scrape::{run_scrape, Coordinator};
use finn_scout::storage::open_store;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Finn-Scout: a real-estate listings watcher
///
/// Finn-Scout fetches a listings search page, extracts every ad card, and
/// stores the listings it has not seen before. Each new listing is recorded
/// in the operation log.
#[derive(Parser, Debug)]
#[command(name = "finn-scout")]
#[command(version)]
#[command(about = "A real-estate listings watcher", long_about = None)]
struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Fetch and extract the page without touching the store
    #[arg(long, conflicts_with_all = ["list", "export"])]
    dry_run: bool,

    /// Print the stored listings and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export"])]
    list: bool,

    /// Write the stored listings as a markdown table and exit
    #[arg(long, value_name = "PATH", conflicts_with_all = ["dry_run", "list"])]
    export: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    // A missing .env file is fine, the shell environment still applies
    dotenvy::dotenv().ok();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };
    tracing::debug!("Configuration: {:?}", config);

    if cli.dry_run {
        handle_dry_run(config).await
    } else if cli.list {
        handle_list(&config).await
    } else if let Some(path) = cli.export.as_deref() {
        handle_export(&config, path).await
    } else {
        handle_scrape(config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("finn_scout=info,warn"),
            1 => EnvFilter::new("finn_scout=debug,info"),
            2 => EnvFilter::new("finn_scout=trace,debug"),
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

fn describe_store(config: &Config) -> String {
    match &config.store.target {
        StoreTarget::MySql(target) => format!(
            "mysql://{}@{}/{}",
            target.user, target.host, target.database
        ),
        StoreTarget::Sqlite { path } => format!("sqlite://{}", path.display()),
    }
}

/// Handles the --dry-run mode: shows what a run would ingest
async fn handle_dry_run(config: Config) -> anyhow::Result<()> {
    println!("=== Finn-Scout Dry Run ===\n");
    println!("Source: {}", config.source.url);
    println!("Store: {}", describe_store(&config));
    println!("Log file: {}", config.log.path.display());
    println!();

    let coordinator = Coordinator::new(config)?;
    let records = coordinator.preview().await;
    coordinator.store().close().await;
    let records = records?;

    for record in &records {
        println!(
            "- {} | {} | {}",
            record.title.as_deref().unwrap_or("<untitled>"),
            record.price.as_deref().unwrap_or("-"),
            record.url.as_deref().unwrap_or("-")
        );
    }

    println!("\n✓ {} unique ads found, nothing was stored", records.len());

    Ok(())
}

/// Handles the --list mode: prints the stored listings
async fn handle_list(config: &Config) -> anyhow::Result<()> {
    println!("Store: {}\n", describe_store(config));

    let store = open_store(&config.store);
    let listings = store
        .list_listings()
        .await
        .context("failed to read stored listings")?;
    store.close().await;

    print_listings(&listings);

    Ok(())
}

/// Handles the --export mode: writes the stored listings as markdown
async fn handle_export(config: &Config, path: &Path) -> anyhow::Result<()> {
    let store = open_store(&config.store);
    let listings = store
        .list_listings()
        .await
        .context("failed to read stored listings")?;
    store.close().await;

    write_markdown_listings(&listings, path)
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!("✓ {} listings exported to: {}", listings.len(), path.display());

    Ok(())
}

/// Handles the main scrape run
async fn handle_scrape(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting scrape of {}", config.source.url);
    tracing::info!("Store: {}", describe_store(&config));

    let summary = match run_scrape(config).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("Scrape failed: {}", e);
            return Err(e.into());
        }
    };

    print_run_summary(&summary);

    // Row failures are part of a completed run and do not fail the process
    if summary.report.has_errors() {
        tracing::warn!(
            "{} of {} listings could not be stored",
            summary.report.errors.len(),
            summary.unique
        );
    }

    Ok(())
}
