//! Folio main entry point
//!
//! This is the command-line interface for the Folio catalog crawler.

use clap::Parser;
use folio_crawler::config::load_config_with_hash;
use folio_crawler::crawler::{run_crawl, target_collection, CrawlMode};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Folio: a book-catalog crawler
///
/// Folio walks a catalog site's category menu, follows every listing page and
/// stores one document per book, or stores the category menu itself.
#[derive(Parser, Debug)]
#[command(name = "folio-crawler")]
#[command(version)]
#[command(about = "A book-catalog crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// What to crawl: books or categories
    #[arg(short, long, default_value = "books")]
    mode: CrawlMode,

    /// Collection for categories mode (defaults to output.categories-collection)
    #[arg(short, long)]
    collection: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show document counts from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, _config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config, cli.mode, cli.collection.as_deref());
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(&config, cli.mode, cli.collection.as_deref()).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("folio_crawler=info,warn"),
            1 => EnvFilter::new("folio_crawler=debug,info"),
            2 => EnvFilter::new("folio_crawler=trace,debug"),
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
fn handle_dry_run(config: &folio_crawler::Config, mode: CrawlMode, collection: Option<&str>) {
    println!("=== Folio Dry Run ===\n");

    println!("Target:");
    println!("  Root URL: {}", config.target.root_url);
    println!("  Page URL template: {}", config.target.page_url_template);

    println!("\nCrawler Configuration:");
    println!(
        "  Timeouts: connect {}s, request {}s",
        config.crawler.connect_timeout_secs, config.crawler.request_timeout_secs
    );
    println!("  Book batch size: {}", config.crawler.book_batch_size);
    println!("  Category delay: {}ms", config.crawler.category_delay_ms);
    println!("  Channel capacity: {}", config.crawler.channel_capacity);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!(
        "  Collection: {}",
        target_collection(config, mode, collection)
    );

    println!("\n✓ Configuration is valid");
    println!("✓ Would crawl {} from {}", mode, config.target.root_url);
}

/// Handles the --stats mode: shows document counts per collection
fn handle_stats(config: &folio_crawler::Config) -> Result<(), Box<dyn std::error::Error>> {
    use folio_crawler::output::{load_statistics, print_statistics};
    use folio_crawler::storage::SqliteDocumentStore;
    use std::path::Path;

    println!("Database: {}\n", config.output.database_path);

    let store = SqliteDocumentStore::open(
        Path::new(&config.output.database_path),
        &config.output.books_collection,
    )?;
    let stats = load_statistics(&store)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: &folio_crawler::Config,
    mode: CrawlMode,
    collection: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    match run_crawl(config, mode, collection).await {
        Ok(report) => {
            tracing::info!(
                "Crawl completed: {} items sent, {} stored, {} failed inserts",
                report.summary.items_sent,
                report.sink.inserted,
                report.sink.failed
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
