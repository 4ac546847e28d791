//! Archive crawler entry point
//!
//! Runs one incremental crawl and prints how many new articles were stored.
//! A scheduler can skip feed regeneration when the count is zero.

use anyhow::Context;
use clap::Parser;
use lmd_audio_crawler::config::{load_config_with_hash, Config};
use lmd_audio_crawler::crawler::crawl;
use lmd_audio_crawler::output::{load_statistics, print_statistics};
use lmd_audio_crawler::storage::SqliteStorage;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Incremental crawler for the audio articles of a text archive
///
/// Fetches the archive index, walks issues newer than the newest stored
/// article, and stores every article that carries audio.
#[derive(Parser, Debug)]
#[command(name = "lmd-audio-crawler")]
#[command(version)]
#[command(about = "Incremental crawler for archive audio articles", long_about = None)]
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

    /// Validate config and show it without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("lmd_audio_crawler=info,warn"),
            1 => EnvFilter::new("lmd_audio_crawler=debug,info"),
            2 => EnvFilter::new("lmd_audio_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Handles the --dry-run mode: shows the validated configuration
fn handle_dry_run(config: &Config) {
    println!("=== Dry Run ===\n");

    println!("Archive:");
    println!("  Base URL: {}", config.archive.base_url);
    println!("  Index path: {}", config.archive.index_path);
    println!("  Audio since: {}", config.archive.media_since);

    println!("\nCrawler:");
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);
    println!("  Index TTL: {}h", config.crawler.index_ttl_hours);
    println!("  Timeout: {}s", config.crawler.timeout_secs);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);

    println!("\nStorage:");
    println!("  Database: {}", config.storage.database_path);
    println!("  Cache: {}", config.storage.cache_dir);

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let path = Path::new(&config.storage.database_path);
    println!("Database: {}\n", path.display());

    let storage = SqliteStorage::new(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling {}{} (audio since {})",
        config.archive.base_url,
        config.archive.index_path,
        config.archive.media_since
    );

    let new_articles = crawl(config).await.context("crawl failed")?;

    if new_articles == 0 {
        tracing::info!("Nothing new");
    }
    println!("{}", new_articles);

    Ok(())
}
