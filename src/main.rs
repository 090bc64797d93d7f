//! Catalog-Harvest main entry point
//!
//! This is the command-line interface for the catalog scraper.

use anyhow::{bail, Context};
use catalog_harvest::config::{load_config_or_default, validate, Config};
use catalog_harvest::crawler::{page_url, start_crawl, CrawlMode, CrawlRequest};
use catalog_harvest::report::{print_summary, render_preview};
use catalog_harvest::sink::{SinkFormat, SinkTarget, Sinks};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Records shown in the preview table after a crawl
const PREVIEW_ROWS: usize = 10;

/// Catalog-Harvest: a paginated catalog scraper
///
/// Walks a product catalog listing page by page, enriches every item from
/// its detail page, and writes the records to CSV, a spreadsheet, SQLite,
/// or MySQL.
#[derive(Parser, Debug)]
#[command(name = "catalog-harvest")]
#[command(version)]
#[command(about = "A paginated catalog scraper", long_about = None)]
struct Cli {
    /// First listing page, or a single product page
    #[arg(value_name = "START_URL")]
    start_url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Stop after this many listing pages
    #[arg(short = 'p', long, value_name = "N")]
    max_pages: Option<u32>,

    /// How to interpret START_URL
    #[arg(short, long, value_enum, default_value_t = CrawlMode::Auto)]
    mode: CrawlMode,

    /// Output format (overrides the config file)
    #[arg(short, long, value_enum)]
    format: Option<SinkFormat>,

    /// Output file for csv, xlsx and sqlite (overrides the config file)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Table or worksheet name (overrides the config file)
    #[arg(short, long)]
    table: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show the resolved settings and first page URLs without fetching anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;
    let request = CrawlRequest::new(&cli.start_url, cli.max_pages)?;
    let target = SinkTarget::from_config(&config.output, &config.mysql);

    if cli.dry_run {
        handle_dry_run(&config, &request, cli.mode, &target);
        return Ok(());
    }

    handle_crawl(&config, request, cli.mode, &target, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_harvest=info,warn"),
            1 => EnvFilter::new("catalog_harvest=debug,info"),
            2 => EnvFilter::new("catalog_harvest=trace,debug"),
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

/// Loads the config file (or defaults) and applies command-line overrides
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    if let Some(path) = &cli.config {
        tracing::info!("Loading configuration from: {}", path.display());
    }
    let mut config = load_config_or_default(cli.config.as_deref())
        .context("failed to load configuration")?;

    if let Some(format) = cli.format {
        config.output.format = format;
    }
    if let Some(output) = &cli.output {
        config.output.path = Some(output.clone());
    }
    if let Some(table) = &cli.table {
        config.output.table = table.clone();
    }

    validate(&config).context("invalid settings")?;
    Ok(config)
}

/// Handles the --dry-run mode: shows what would be crawled and written
fn handle_dry_run(config: &Config, request: &CrawlRequest, mode: CrawlMode, target: &SinkTarget) {
    let start = request.start_url();
    let mode = mode.resolve(start, &config.catalog);

    println!("=== Catalog-Harvest Dry Run ===\n");
    println!("Start URL: {}", start);
    println!("Mode: {:?}", mode);
    match request.max_pages() {
        Some(max) => println!("Page cap: {}", max),
        None => println!("Page cap: none"),
    }
    println!("User agent: {}", config.crawler.user_agent);
    println!(
        "Timeouts: listing {}s, detail {}s",
        config.crawler.listing_timeout_secs, config.crawler.detail_timeout_secs
    );

    if mode == CrawlMode::Category {
        let shown = request.max_pages().unwrap_or(3).min(3);
        println!("\nFirst listing pages:");
        for page in 1..=shown {
            println!("  {}: {}", page, page_url(start, page, &config.catalog));
        }
    }

    println!("\nOutput: {} -> {}", target.format(), target);
    if !Sinks::detect().supports(target.format()) {
        println!("! The {} sink is not available in this build", target.format());
    }
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: &Config,
    request: CrawlRequest,
    mode: CrawlMode,
    target: &SinkTarget,
    quiet: bool,
) -> anyhow::Result<()> {
    let sinks = Sinks::detect();
    if !sinks.supports(target.format()) {
        bail!(
            "the {} sink is not available in this build (enable the `mysql` feature)",
            target.format()
        );
    }

    let handle = start_crawl(config, request, mode)?;

    let cancel = handle.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping after the current page");
            cancel.cancel();
        }
    });

    let result = handle
        .wait_with_progress(|progress| {
            tracing::info!(
                "Finished page {} ({} items so far)",
                progress.page,
                progress.items_so_far
            );
        })
        .await;

    if !quiet {
        print_summary(&result);
        if !result.records.is_empty() {
            print!("{}", render_preview(&result.records, PREVIEW_ROWS));
            println!();
        }
    }

    if result.status.is_failed() && result.records.is_empty() {
        bail!("crawl {}", result.status);
    }

    sinks
        .write(&result.records, target)
        .await
        .with_context(|| format!("failed to write records to {}", target))?;
    tracing::info!("Wrote {} records to {}", result.records.len(), target);

    if result.status.is_failed() {
        tracing::warn!("Crawl stopped early: {}", result.status);
    } else if result.status.is_cancelled() {
        tracing::warn!(
            "Crawl was interrupted, output holds the {} records gathered before the stop",
            result.records.len()
        );
    }

    Ok(())
}
