//! Crawler coordinator - main crawl orchestration logic
//!
//! The coordinator is the single producer on the sink channel. It runs one of
//! two crawl modes:
//! - books: root page → category URLs → listing pages → book pages → records
//! - categories: root page → category tree → one item per top-level category
//!
//! Whatever happens during the crawl, the coordinator finishes by sending
//! [`SinkMessage::Done`] so the writer can stop.

use crate::config::Config;
use crate::crawler::document::resolve_links;
use crate::crawler::extract::{book_record, category_menu_urls, category_tree};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::paginator::{expand_category, PageUrlTemplate};
use crate::crawler::records::{Category, SinkMessage};
use crate::crawler::CrawlMode;
use crate::FolioError;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// Counters describing one crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Categories found on the root page
    pub categories: usize,
    /// Book links collected across all categories (books mode)
    pub book_links: usize,
    /// Book page fetches completed, successful or not
    pub book_pages_attempted: usize,
    pub fetch_failures: usize,
    pub extraction_failures: usize,
    /// Items handed to the sink writer
    pub items_sent: usize,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    fetcher: Fetcher,
    root_url: String,
    page_template: PageUrlTemplate,
    batch_size: usize,
    category_delay: Duration,
    sender: mpsc::Sender<SinkMessage>,
}

impl Coordinator {
    /// Creates a coordinator sending its output on `sender`
    pub fn new(config: &Config, sender: mpsc::Sender<SinkMessage>) -> Result<Self, FolioError> {
        let fetcher = Fetcher::new(&config.crawler, &config.user_agent)?;

        Ok(Self {
            fetcher,
            root_url: config.target.root_url.clone(),
            page_template: PageUrlTemplate::new(config.target.page_url_template.clone()),
            batch_size: config.crawler.book_batch_size.max(1),
            category_delay: config.crawler.category_delay(),
            sender,
        })
    }

    /// Runs the crawl and then sends the sentinel
    ///
    /// The sentinel goes out even when the crawl fails, so a writer waiting on
    /// the other end of the channel always terminates.
    pub async fn run(self, mode: CrawlMode) -> Result<CrawlSummary, FolioError> {
        tracing::info!(%mode, root = %self.root_url, "Starting crawl");

        let outcome = match mode {
            CrawlMode::Books => self.crawl_books().await,
            CrawlMode::Categories => self.crawl_categories().await,
        };

        let done = self
            .sender
            .send(SinkMessage::Done)
            .await
            .map_err(|_| FolioError::ChannelClosed);

        let summary = outcome?;
        done?;

        tracing::info!(
            categories = summary.categories,
            book_links = summary.book_links,
            items = summary.items_sent,
            fetch_failures = summary.fetch_failures,
            extraction_failures = summary.extraction_failures,
            "Crawl finished"
        );
        Ok(summary)
    }

    async fn crawl_books(&self) -> Result<CrawlSummary, FolioError> {
        let mut summary = CrawlSummary::default();

        let root = self.fetch_root().await?;
        let category_urls = resolve_links(category_menu_urls(&root), &self.root_url);
        summary.categories = category_urls.len();
        tracing::info!("Found {} categories", category_urls.len());

        // Categories one after another; each category's pages are concurrent
        let mut book_links = Vec::new();
        for category_url in &category_urls {
            let links = expand_category(&self.fetcher, category_url, &self.page_template).await;
            tracing::info!(category = %category_url, books = links.len(), "Category expanded");
            book_links.extend(links);
        }
        summary.book_links = book_links.len();

        self.fetch_books(&book_links, &mut summary).await?;
        Ok(summary)
    }

    /// Fetches book pages in fixed-size batches and sends each parsed record
    ///
    /// Every fetch of a batch runs as its own task, so a send blocked on a
    /// full channel does not stall the fetches still in flight.
    async fn fetch_books(
        &self,
        book_links: &[String],
        summary: &mut CrawlSummary,
    ) -> Result<(), FolioError> {
        let total = book_links.len();
        let progress = progress_bar(total);

        for batch in book_links.chunks(self.batch_size) {
            let mut pending = JoinSet::new();
            for url in batch {
                let fetcher = self.fetcher.clone();
                let url = url.clone();
                pending.spawn(async move {
                    let result = fetcher.fetch(&url).await;
                    (url, result)
                });
            }

            while let Some(joined) = pending.join_next().await {
                summary.book_pages_attempted += 1;
                progress.inc(1);
                tracing::debug!("Fetched book info: {}/{}", summary.book_pages_attempted, total);

                let (url, result) = match joined {
                    Ok(done) => done,
                    Err(e) => {
                        summary.fetch_failures += 1;
                        tracing::error!(error = %e, "Book fetch task failed");
                        continue;
                    }
                };

                let body = match result {
                    Ok(body) => body,
                    Err(e) => {
                        summary.fetch_failures += 1;
                        tracing::error!(url = %e.url, cause = %e.cause, "Failed to fetch page of book");
                        continue;
                    }
                };

                match book_record(&body) {
                    Ok(record) => {
                        self.send(record.into()).await?;
                        summary.items_sent += 1;
                    }
                    Err(e) => {
                        summary.extraction_failures += 1;
                        tracing::warn!(
                            url = %url,
                            title = e.document_title().unwrap_or("<untitled>"),
                            error = %e,
                            "Book info parsing error"
                        );
                    }
                }
            }
        }

        progress.finish_and_clear();
        Ok(())
    }

    async fn crawl_categories(&self) -> Result<CrawlSummary, FolioError> {
        let root = self.fetch_root().await?;
        let categories = category_tree(&root);
        tracing::info!("Found {} categories", categories.len());

        let count = categories.len();
        let sent = send_categories(categories, &self.sender, self.category_delay).await?;

        Ok(CrawlSummary {
            categories: count,
            items_sent: sent,
            ..CrawlSummary::default()
        })
    }

    async fn fetch_root(&self) -> Result<String, FolioError> {
        self.fetcher.fetch(&self.root_url).await.map_err(|e| {
            tracing::error!(url = %e.url, cause = %e.cause, "Failed to fetch catalog root page");
            FolioError::from(e)
        })
    }

    async fn send(&self, message: SinkMessage) -> Result<(), FolioError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| FolioError::ChannelClosed)
    }
}

/// Sends categories one by one, pausing `delay` after each
///
/// Returns how many were sent. Does not send the sentinel.
pub async fn send_categories(
    categories: Vec<Category>,
    sender: &mpsc::Sender<SinkMessage>,
    delay: Duration,
) -> Result<usize, FolioError> {
    let mut sent = 0;
    for category in categories {
        tracing::debug!(name = %category.name, "Sending category");
        sender
            .send(category.into())
            .await
            .map_err(|_| FolioError::ChannelClosed)?;
        sent += 1;
        tokio::time::sleep(delay).await;
    }
    Ok(sent)
}

fn progress_bar(total: usize) -> ProgressBar {
    let bar = ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::stderr());
    let style = ProgressStyle::with_template(
        "Fetched book info: {pos}/{len} [{elapsed_precise}] {wide_bar} ({eta})",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("##-");
    bar.set_style(style);
    bar
}
