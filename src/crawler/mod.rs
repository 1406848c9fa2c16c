//! Crawler module for catalog fetching and extraction
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with per-request timeouts
//! - HTML extraction of category, listing and book pages
//! - Concurrent pagination of category listings
//! - Overall crawl coordination feeding the sink writer

mod coordinator;
mod document;
pub mod extract;
mod fetcher;
mod paginator;
mod records;

pub use coordinator::{send_categories, Coordinator, CrawlSummary};
pub use document::{resolve_link, resolve_links, HtmlDocument, HtmlNode};
pub use fetcher::{build_http_client, Fetcher};
pub use paginator::{expand_category, PageUrlTemplate, MAX_LISTING_PAGES};
pub use records::{BookRecord, Category, CrawlItem, SinkMessage};

use crate::config::{validate_collection_name, Config};
use crate::output::{SinkReport, SinkWriter};
use crate::storage::{DocumentStore, SqliteDocumentStore};
use crate::FolioError;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tokio::sync::mpsc;

/// What a crawl run collects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlMode {
    /// Every book page reachable from the category menu
    Books,
    /// The category menu itself
    Categories,
}

impl fmt::Display for CrawlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Books => write!(f, "books"),
            Self::Categories => write!(f, "categories"),
        }
    }
}

impl FromStr for CrawlMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "books" => Ok(Self::Books),
            "categories" => Ok(Self::Categories),
            other => Err(format!(
                "unknown crawl mode '{}', expected 'books' or 'categories'",
                other
            )),
        }
    }
}

/// Outcome of a full crawl: what the coordinator produced and what the writer stored
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub summary: CrawlSummary,
    pub sink: SinkReport,
}

/// Picks the collection a run writes to
///
/// Books always go to the configured books collection. Categories go to
/// `requested` when given, else to the configured categories collection.
pub fn target_collection(config: &Config, mode: CrawlMode, requested: Option<&str>) -> String {
    match (mode, requested) {
        (CrawlMode::Categories, Some(name)) => name.to_string(),
        (CrawlMode::Categories, None) => config.output.categories_collection.clone(),
        (CrawlMode::Books, requested) => {
            if let Some(name) = requested {
                tracing::warn!(
                    "Ignoring collection '{}': books are written to '{}'",
                    name,
                    config.output.books_collection
                );
            }
            config.output.books_collection.clone()
        }
    }
}

/// Runs a complete crawl against the configured SQLite document store
///
/// # Example
///
/// ```no_run
/// use folio_crawler::config::load_config;
/// use folio_crawler::crawler::{run_crawl, CrawlMode};
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("folio.toml"))?;
/// let report = run_crawl(&config, CrawlMode::Books, None).await?;
/// println!("stored {} records", report.sink.inserted);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: &Config,
    mode: CrawlMode,
    collection: Option<&str>,
) -> Result<CrawlReport, FolioError> {
    let collection = target_collection(config, mode, collection);
    validate_collection_name(&collection)?;

    let store = SqliteDocumentStore::open(Path::new(&config.output.database_path), &collection)?;
    tracing::info!(
        database = %config.output.database_path,
        collection = %collection,
        "Writing to document store"
    );

    run_pipeline(config, mode, store).await
}

/// Wires coordinator, channel and sink writer around any document store
///
/// The writer is started before the crawl begins and owns `store` for the
/// whole run. Returns once the writer has drained the channel.
pub async fn run_pipeline<S>(
    config: &Config,
    mode: CrawlMode,
    store: S,
) -> Result<CrawlReport, FolioError>
where
    S: DocumentStore + Send + 'static,
{
    let (sender, receiver) = mpsc::channel(config.crawler.channel_capacity.max(1));
    let coordinator = Coordinator::new(config, sender)?;
    let writer = SinkWriter::new(store, receiver).spawn();

    let crawled = coordinator.run(mode).await;
    let sink = writer
        .await
        .map_err(|e| FolioError::Writer(e.to_string()))?;

    Ok(CrawlReport {
        summary: crawled?,
        sink,
    })
}
