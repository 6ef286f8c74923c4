//! Article-Ripple main entry point
//!
//! This is the command-line interface for the Article-Ripple crawler.

use anyhow::Context;
use article_ripple::config::{load_config, Config};
use article_ripple::crawler::{
    harvest_category, harvest_seeds, load_frontier, run_crawl, DEFAULT_CATEGORY_DEPTH,
};
use article_ripple::output::{
    load_statistics, print_category_report, print_harvest_report, print_report, print_statistics,
};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Article-Ripple: a resumable, keyword-gated article crawler
///
/// Article-Ripple walks an online encyclopedia breadth-first from a seed
/// file, saves the text of every article that mentions one of the configured
/// keywords, and checkpoints its frontier so an interrupted crawl resumes.
#[derive(Parser, Debug)]
#[command(name = "article-ripple")]
#[command(version = "1.0.0")]
#[command(about = "A resumable, keyword-gated article crawler", long_about = None)]
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

    /// Start a fresh crawl from the seed file, ignoring the checkpoint
    #[arg(long)]
    fresh: bool,

    /// Validate config and show what would be crawled without fetching anything
    #[arg(long, conflicts_with_all = ["stats", "harvest", "harvest_category"])]
    dry_run: bool,

    /// Show statistics from the checkpoint and exit
    #[arg(long, conflicts_with_all = ["dry_run", "harvest", "harvest_category", "fresh"])]
    stats: bool,

    /// Search for QUERY and add the results to the seed file, then exit
    #[arg(long, value_name = "QUERY", conflicts_with_all = ["dry_run", "stats", "fresh"])]
    harvest: Option<String>,

    /// Add the articles of CATEGORY and its subcategories to the seed file, then exit
    #[arg(
        long,
        value_name = "CATEGORY",
        conflicts_with_all = ["dry_run", "stats", "fresh", "harvest"]
    )]
    harvest_category: Option<String>,

    /// Subcategory levels followed by --harvest-category
    #[arg(long, value_name = "N", default_value_t = DEFAULT_CATEGORY_DEPTH)]
    category_depth: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully");

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config, cli.fresh)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if let Some(query) = cli.harvest.as_deref() {
        handle_harvest(&config, query).await?;
    } else if let Some(category) = cli.harvest_category.as_deref() {
        handle_harvest_category(&config, category, cli.category_depth).await?;
    } else {
        handle_crawl(&config, cli.fresh).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("article_ripple=info,warn"),
            1 => EnvFilter::new("article_ripple=debug,info"),
            2 => EnvFilter::new("article_ripple=trace,debug"),
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
fn handle_dry_run(config: &Config, fresh: bool) -> anyhow::Result<()> {
    println!("=== Article-Ripple Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Article limit: {}", config.crawler.article_limit);
    println!("  Politeness delay: {}ms", config.crawler.politeness_delay);
    println!("  Keywords ({}):", config.crawler.keywords.len());
    for keyword in &config.crawler.keywords {
        println!("    * {}", keyword);
    }

    println!("\nProvider:");
    println!("  Endpoint: {}", config.provider.endpoint_root());
    println!("  Requests per hour: {}", config.provider.requests_per_hour);
    println!("  Max retries: {}", config.provider.max_retries);
    println!("  User agent: {}", config.provider.user_agent);
    println!(
        "  Access token: {}",
        if config.provider.access_token.is_some() {
            "set"
        } else {
            "not set"
        }
    );

    println!("\nOutput:");
    println!("  Data directory: {}", config.output.data_dir.display());
    println!("  Checkpoint: {}", config.output.checkpoint_path.display());
    println!("  Seed file: {}", config.output.seed_path.display());

    let frontier = load_frontier(&config.output, fresh).context("Failed to build frontier")?;

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would start crawling with {} queued articles ({} already visited)",
        frontier.queue_len(),
        frontier.visited_count()
    );

    Ok(())
}

/// Handles the --stats mode: shows statistics from the checkpoint
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Checkpoint: {}\n", config.output.checkpoint_path.display());

    let stats = load_statistics(config).context("Failed to load statistics")?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --harvest mode: fills the seed file from search results
async fn handle_harvest(config: &Config, query: &str) -> anyhow::Result<()> {
    let report = harvest_seeds(config, query)
        .await
        .with_context(|| format!("Seed harvest for {:?} failed", query))?;
    print_harvest_report(&report);

    Ok(())
}

/// Handles the --harvest-category mode: fills the seed file from a category tree
async fn handle_harvest_category(
    config: &Config,
    category: &str,
    depth: u32,
) -> anyhow::Result<()> {
    let report = harvest_category(config, category, depth)
        .await
        .with_context(|| format!("Category harvest for {:?} failed", category))?;
    print_category_report(&report);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, fresh: bool) -> anyhow::Result<()> {
    tracing::info!(
        "Keywords: {}, article limit: {}, max depth: {}",
        config.crawler.keywords.join(", "),
        config.crawler.article_limit,
        config.crawler.max_depth
    );

    let report = match run_crawl(config, fresh).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    print_report(&report);

    // Every stop state exits with status 0
    if report.state.is_complete() {
        tracing::info!("Crawl completed: {}", report.state);
    } else if report.error.is_some() {
        tracing::warn!("Crawl stopped early; rerun to resume from the checkpoint");
    } else {
        tracing::info!("Crawl interrupted; rerun to resume from the checkpoint");
    }

    Ok(())
}
