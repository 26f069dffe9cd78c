//! Review-Harvest main entry point
//!
//! This is the command-line interface for the Review-Harvest scraper.

use anyhow::Context;
use clap::Parser;
use review_harvest::config::{load_config_with_hash, Config};
use review_harvest::crawler::crawl;
use review_harvest::output::print_result;
use review_harvest::state::CrawlState;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Review-Harvest: a breadth-first review scraper
///
/// Review-Harvest walks a review site from a start URL, follows links that
/// match a glob and writes the text of every review page to JSON.
#[derive(Parser, Debug)]
#[command(name = "review-harvest")]
#[command(version)]
#[command(about = "A breadth-first review scraper", long_about = None)]
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
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let result = crawl(config).await.context("Crawl could not start")?;
    if !cli.quiet {
        print_result(&result);
    }

    if result.state == CrawlState::Aborted {
        anyhow::bail!("Crawl aborted: {}", result.stop_reason);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("review_harvest=info,warn"),
            1 => EnvFilter::new("review_harvest=debug,info"),
            2 => EnvFilter::new("review_harvest=trace,debug"),
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
    let crawl = &config.crawl;

    println!("=== Review-Harvest Dry Run ===\n");

    println!("Crawl:");
    println!("  Start URL: {}", crawl.start_url);
    println!("  Allowed prefix: {}", crawl.scope_prefix());
    println!("  Link pattern: {}", crawl.link_pattern);
    println!("  Content selector: {}", crawl.content_selector);
    println!(
        "  Content path: {}",
        crawl.content_path.as_deref().unwrap_or("(any non-root page)")
    );
    println!("  Max pages: {}", crawl.max_pages);
    match crawl.request_timeout_secs {
        Some(secs) => println!("  Request timeout: {}s", secs),
        None => println!("  Request timeout: none"),
    }
    match crawl.max_runtime_secs {
        Some(secs) => println!("  Max runtime: {}s", secs),
        None => println!("  Max runtime: none"),
    }

    println!("\nOutput:");
    println!("  Path: {}", config.output.path);
    println!("  Format: {:?}", config.output.format);

    match &config.auth {
        Some(auth) => println!("\nAuth cookie: {}", auth.cookie_name),
        None => println!("\nAuth cookie: none"),
    }

    println!("\n✓ Configuration is valid");
}
