use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Folio
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub target: TargetConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// The catalog site being crawled
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    /// Root page serving the category menu
    #[serde(rename = "root-url")]
    pub root_url: String,

    /// Listing page URL rule; `{url}` is the category URL, `{n}` the page number
    #[serde(rename = "page-url-template", default = "default_page_url_template")]
    pub page_url_template: String,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// TCP connect timeout for every fetch (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Whole-request timeout for every fetch (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Number of book pages fetched concurrently per batch
    #[serde(rename = "book-batch-size", default = "default_book_batch_size")]
    pub book_batch_size: usize,

    /// Pause after each category sent in categories mode (milliseconds)
    #[serde(rename = "category-delay-ms", default = "default_category_delay_ms")]
    pub category_delay_ms: u64,

    /// Capacity of the bounded channel feeding the sink writer
    #[serde(rename = "channel-capacity", default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl CrawlerConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn category_delay(&self) -> Duration {
        Duration::from_millis(self.category_delay_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_timeout_secs(),
            request_timeout_secs: default_timeout_secs(),
            book_batch_size: default_book_batch_size(),
            category_delay_ms: default_category_delay_ms(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Format: CrawlerName/Version (+ContactURL; ContactEmail)
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite document database
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Collection receiving book records
    #[serde(rename = "books-collection", default = "default_books_collection")]
    pub books_collection: String,

    /// Collection receiving categories when none is given on the command line
    #[serde(
        rename = "categories-collection",
        default = "default_categories_collection"
    )]
    pub categories_collection: String,
}

pub(crate) fn default_page_url_template() -> String {
    "{url}page/{n}/".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_book_batch_size() -> usize {
    50
}

fn default_category_delay_ms() -> u64 {
    500
}

fn default_channel_capacity() -> usize {
    100
}

fn default_books_collection() -> String {
    "books".to_string()
}

fn default_categories_collection() -> String {
    "categories".to_string()
}
