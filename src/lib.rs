//! Folio: a book-catalog crawler
//!
//! This crate crawls a book-catalog website, expands its categories into book
//! pages, extracts structured book records and writes them to a document store
//! through a bounded producer/consumer pipeline.

pub mod config;
pub mod crawler;
pub mod output;
pub mod storage;

use thiserror::Error;

/// Main error type for Folio operations
#[derive(Debug, Error)]
pub enum FolioError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Sink channel closed before the crawl finished")]
    ChannelClosed,

    #[error("Sink writer task failed: {0}")]
    Writer(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// A failed page fetch, tagged with the URL that was requested
#[derive(Debug, Error)]
#[error("Failed to fetch {url}: {cause}")]
pub struct FetchError {
    pub url: String,
    pub cause: FetchCause,
}

/// Why a fetch failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchCause {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("failed to read body: {0}")]
    Body(String),

    #[error("{0}")]
    Request(String),
}

/// Structural mismatch between a document and the catalog's page layout
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("missing element `{marker}` (document: {})", doc_title(.title))]
    MissingElement {
        marker: &'static str,
        title: Option<String>,
    },

    #[error("missing required field `{label}` (document: {})", doc_title(.title))]
    MissingField {
        label: &'static str,
        title: Option<String>,
    },

    #[error("field `{label}` is not a number: {value:?} (document: {})", doc_title(.title))]
    InvalidNumber {
        label: &'static str,
        value: String,
        title: Option<String>,
    },

    #[error("{labels} labels but {values} values in book details (document: {})", doc_title(.title))]
    MismatchedDetails {
        labels: usize,
        values: usize,
        title: Option<String>,
    },
}

fn doc_title(title: &Option<String>) -> &str {
    title.as_deref().unwrap_or("<untitled>")
}

impl ExtractError {
    /// Title of the document that failed to extract, when one was found
    pub fn document_title(&self) -> Option<&str> {
        match self {
            Self::MissingElement { title, .. }
            | Self::MissingField { title, .. }
            | Self::InvalidNumber { title, .. }
            | Self::MismatchedDetails { title, .. } => title.as_deref(),
        }
    }
}

/// Result type alias for Folio operations
pub type Result<T> = std::result::Result<T, FolioError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{BookRecord, Category, CrawlItem, CrawlMode, SinkMessage};
