//! Serp-Harvester main entry point
//!
//! This is the command-line interface for the Serp-Harvester bulk search harvester.

use anyhow::{bail, Context};
use clap::Parser;
use serp_harvester::config::{load_config_with_hash, Config};
use serp_harvester::output::{print_statistics, WriteOutcome};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Serp-Harvester: bulk keyword search harvesting
///
/// Serp-Harvester runs every query in a CSV file against a paginated search
/// API, keeps one result per registrable domain across all queries, and
/// writes a combined CSV table plus a per-query page-count report.
#[derive(Parser, Debug)]
#[command(name = "serp-harvester")]
#[command(version)]
#[command(about = "Bulk keyword search harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// CSV file with one query per row in its first column
    #[arg(value_name = "QUERIES")]
    queries: PathBuf,

    /// Search API key
    #[arg(long, env = "SERP_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and queries and show what would run without sending requests
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let queries = load_queries(&cli.queries)?;
    tracing::info!(
        "Loaded {} queries from {}",
        queries.len(),
        cli.queries.display()
    );

    if cli.dry_run {
        handle_dry_run(&config, &queries);
        return Ok(());
    }

    let Some(api_key) = cli.api_key else {
        bail!("No API key given; pass --api-key or set SERP_API_KEY");
    };

    handle_harvest(config, queries, &api_key).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("serp_harvester=info,warn"),
            1 => EnvFilter::new("serp_harvester=debug,info"),
            2 => EnvFilter::new("serp_harvester=trace,debug"),
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

/// Reads the query list: the first column of every row, skipping blank cells
fn load_queries(path: &Path) -> anyhow::Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open query file {}", path.display()))?;

    let mut queries = Vec::new();
    for row in reader.records() {
        let row = row.with_context(|| format!("Failed to read query file {}", path.display()))?;
        if let Some(query) = row.get(0).map(str::trim).filter(|q| !q.is_empty()) {
            queries.push(query.to_string());
        }
    }

    if queries.is_empty() {
        bail!("No queries found in {}", path.display());
    }
    Ok(queries)
}

/// Handles the --dry-run mode: shows what would be harvested
fn handle_dry_run(config: &Config, queries: &[String]) {
    println!("=== Serp-Harvester Dry Run ===\n");

    println!("Search API:");
    println!("  Endpoint: {}", config.search.endpoint);
    println!("  Key header: {}", config.search.api_key_header);
    println!("  Results field: {}", config.search.results_field);
    if let Some(num) = config.search.results_per_page {
        println!("  Results per page: {}", num);
    }
    println!("  Request timeout: {}ms", config.search.request_timeout_ms);

    println!("\nHarvest:");
    println!(
        "  Max concurrent queries: {}",
        config.harvest.max_concurrent_queries
    );
    println!(
        "  Empty page threshold: {}",
        config.harvest.empty_page_threshold
    );
    println!("  Max pages per query: {}", config.harvest.max_pages);

    match &config.rate_limit {
        Some(limit) => println!(
            "  Rate limit: {} requests/s ({:?})",
            limit.requests_per_second, limit.policy
        ),
        None => println!("  Rate limit: none"),
    }

    println!("\nUser Agent: {}", config.user_agent.header_value());
    println!("Output directory: {}", config.output.directory);

    println!("\nQueries ({}):", queries.len());
    for query in queries.iter().take(20) {
        println!("  - {}", query);
    }
    if queries.len() > 20 {
        println!("  ... and {} more", queries.len() - 20);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would run {} queries", queries.len());
}

/// Handles the main harvest operation
async fn handle_harvest(
    config: Config,
    queries: Vec<String>,
    api_key: &str,
) -> anyhow::Result<()> {
    let outcome = match serp_harvester::run(config, queries, api_key).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            return Err(e.into());
        }
    };

    print_statistics(&outcome.statistics);
    println!();

    println!("Session: {}", outcome.session_id);
    match &outcome.results {
        WriteOutcome::Written { path, row_count } => {
            println!("✓ Results: {} ({} unique domains)", path.display(), row_count)
        }
        WriteOutcome::Empty => println!("No records were harvested; no result table written"),
    }
    if let Some(path) = outcome.diagnostics.path() {
        println!("✓ Page counts: {}", path.display());
    }

    Ok(())
}
