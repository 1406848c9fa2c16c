//! Items produced by the crawl and the messages carrying them to the sink

use serde::Serialize;

/// Metadata extracted from one book detail page
///
/// Serialized field names are the persisted document's field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    pub title: String,
    pub author: String,
    pub isbn10: String,
    /// 0 when the page has no `Year:` entry
    pub year: u32,
    /// 0 when the page has no `Pages:` entry
    pub pages: u32,
    pub language: String,
    pub file_size: String,
    pub file_format: String,
    pub category: String,
    pub download_urls: Vec<String>,
    pub cover_image_url: String,
    pub description: String,
}

/// A top-level entry of the catalog's category menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub name: String,
    pub subcategories: Vec<String>,
}

/// Anything the crawl hands to the sink writer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CrawlItem {
    Book(BookRecord),
    Category(Category),
}

/// Element type of the coordinator → sink channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkMessage {
    /// An item to persist
    Record(CrawlItem),
    /// No more items will follow
    Done,
}

impl From<BookRecord> for SinkMessage {
    fn from(record: BookRecord) -> Self {
        Self::Record(CrawlItem::Book(record))
    }
}

impl From<Category> for SinkMessage {
    fn from(category: Category) -> Self {
        Self::Record(CrawlItem::Category(category))
    }
}
