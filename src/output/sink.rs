//! Sink writer: the single consumer of the crawl channel
//!
//! Runs on a blocking thread because the document store is synchronous.
//! Each received item is inserted once; failed inserts are logged and
//! dropped. The loop ends on [`SinkMessage::Done`], or if every sender is
//! dropped without one.

use crate::crawler::{CrawlItem, SinkMessage};
use crate::storage::{DocumentStore, StorageResult};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// What the writer did before it stopped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SinkReport {
    pub attempted: usize,
    pub inserted: usize,
    pub failed: usize,
    /// False when the channel closed without a sentinel
    pub finished_cleanly: bool,
}

pub struct SinkWriter<S> {
    store: S,
    receiver: mpsc::Receiver<SinkMessage>,
}

impl<S> SinkWriter<S>
where
    S: DocumentStore + Send + 'static,
{
    pub fn new(store: S, receiver: mpsc::Receiver<SinkMessage>) -> Self {
        Self { store, receiver }
    }

    /// Starts the writer on tokio's blocking pool
    pub fn spawn(self) -> JoinHandle<SinkReport> {
        tokio::task::spawn_blocking(move || self.run())
    }

    /// Drains the channel until the sentinel arrives
    ///
    /// Blocks the current thread; must not be called from async code
    /// (use [`SinkWriter::spawn`]).
    pub fn run(mut self) -> SinkReport {
        let mut report = SinkReport::default();

        loop {
            match self.receiver.blocking_recv() {
                Some(SinkMessage::Done) => {
                    report.finished_cleanly = true;
                    break;
                }
                Some(SinkMessage::Record(item)) => {
                    report.attempted += 1;
                    match self.write(&item) {
                        Ok(id) => {
                            report.inserted += 1;
                            tracing::debug!(id, "Document inserted");
                        }
                        Err(e) => {
                            report.failed += 1;
                            tracing::error!(item = %describe(&item), error = %e, "Failed to insert document");
                        }
                    }
                }
                None => {
                    tracing::warn!("Crawl channel closed without a completion message");
                    break;
                }
            }
        }

        tracing::info!(
            inserted = report.inserted,
            failed = report.failed,
            "Sink writer finished"
        );
        report
    }

    fn write(&mut self, item: &CrawlItem) -> StorageResult<i64> {
        let document = serde_json::to_value(item)?;
        self.store.insert_one(&document)
    }
}

fn describe(item: &CrawlItem) -> &str {
    match item {
        CrawlItem::Book(book) => &book.title,
        CrawlItem::Category(category) => &category.name,
    }
}
