//! Sumi-Seek main entry point
//!
//! This is the command-line interface for the Sumi-Seek crawler and search index.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use sumi_seek::config::{load_config_with_hash, validate, validate_seed, Config};
use sumi_seek::crawler::{build_http_client, crawl, page_title};
use sumi_seek::index::{open_index, Analyzer, SearchIndex};
use sumi_seek::state::print_report;
use tracing_subscriber::EnvFilter;

/// Sumi-Seek: A polite crawler with a TF-IDF search index
///
/// Sumi-Seek crawls a single host from a seed URL while respecting
/// robots.txt disallow rules and crawl delays, and indexes the words of
/// every page it reaches for TF-IDF search.
#[derive(Parser, Debug)]
#[command(name = "sumi-seek")]
#[command(version)]
#[command(about = "A polite crawler with a TF-IDF search index", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Seed URL, overriding `crawler.seed` from the config
    #[arg(long, value_name = "URL")]
    seed: Option<String>,

    /// Search the index for a term after crawling (repeatable)
    #[arg(long = "search", value_name = "TERM")]
    search: Vec<String>,

    /// Skip crawling and only search an existing index
    #[arg(long, requires = "search")]
    no_crawl: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with_all = ["stats", "no_crawl"])]
    dry_run: bool,

    /// Show statistics from the index and exit
    #[arg(long, conflicts_with_all = ["dry_run", "no_crawl"])]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(seed) = &cli.seed {
        validate_seed(seed).context("Invalid --seed")?;
        config.crawler.seed = Some(seed.clone());
    }
    validate(&config).context("Invalid configuration")?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let index = open_index(&config.index).context("Failed to open index")?;

    if cli.stats {
        return handle_stats(index.as_ref());
    }

    if !cli.no_crawl {
        handle_crawl(&config, Arc::clone(&index)).await?;
    }

    if !cli.search.is_empty() {
        handle_search(&config, index.as_ref(), &cli.search).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_seek=info,warn"),
            1 => EnvFilter::new("sumi_seek=debug,info"),
            2 => EnvFilter::new("sumi_seek=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Sumi-Seek Dry Run ===\n");

    let crawler = &config.crawler;
    println!("Crawler Configuration:");
    println!("  Seed: {}", crawler.seed.as_deref().unwrap_or("(none)"));
    println!(
        "  Workers: {} fetch / {} extract / {} clean",
        crawler.fetch_workers, crawler.extract_workers, crawler.clean_workers
    );
    println!("  Queue capacity: {}", crawler.queue_capacity);
    println!("  Max frontier: {}", crawler.max_frontier);
    println!("  Max visited: {}", crawler.max_visited);
    println!("  Default crawl delay: {:?}", crawler.default_crawl_delay());
    println!("  Stall timeout: {:?}", crawler.stall_timeout());
    println!("  Drain timeout: {:?}", crawler.drain_timeout());

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nIndex:");
    println!("  Backend: {}", config.index.backend.as_str());
    println!("  Database: {}", config.index.database_path);
    println!("  Reset on open: {}", config.index.reset);

    println!("\nStopwords:");
    println!("  {}", config.stopwords.path.as_deref().unwrap_or("(built-in English list)"));

    println!("\n✓ Configuration is valid");
    if crawler.seed.is_none() {
        println!("! No seed configured; pass --seed to crawl");
    }
}

/// Handles the --stats mode: shows the size of the index
fn handle_stats(index: &dyn SearchIndex) -> anyhow::Result<()> {
    let stats = index.stats().context("Failed to read index statistics")?;

    println!("=== Index Statistics ===\n");
    println!("Backend: {}", index.backend_name());
    println!("  Documents: {}", stats.documents);
    println!("  Terms: {}", stats.terms);
    println!("  Postings: {}", stats.postings);
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, index: Arc<dyn SearchIndex>) -> anyhow::Result<()> {
    if config.crawler.seed.is_none() {
        bail!("No seed URL: set crawler.seed in the config or pass --seed");
    }

    let analyzer = Analyzer::from_config(&config.stopwords).context("Failed to load stopwords")?;
    tracing::info!("Loaded {} stopwords", analyzer.stopword_count());

    let report = crawl(config, index, Arc::new(analyzer))
        .await
        .context("Crawl failed")?;

    if report.was_cut_short() {
        tracing::warn!("Crawl ended early: {:?}", report.stop_reason);
    }
    print_report(&report);
    Ok(())
}

/// Prints TF-IDF hits for each term, titled by fetching each hit's page
async fn handle_search(config: &Config, index: &dyn SearchIndex, terms: &[String]) -> anyhow::Result<()> {
    let client = build_http_client(&config.user_agent, config.crawler.request_timeout())
        .context("Failed to build HTTP client")?;

    for term in terms {
        let hits = index
            .tfidf(term)
            .with_context(|| format!("Search for '{}' failed", term))?;

        println!("\n=== Results for '{}' ({} hits) ===", term, hits.len());
        for (rank, hit) in hits.iter().enumerate() {
            let title = page_title(&client, &hit.url).await;
            println!("{:>3}. {} [{:.5}]", rank + 1, title, hit.score);
            println!("     {}", hit.url);
        }
    }
    Ok(())
}
