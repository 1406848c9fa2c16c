//! Output module: where crawled items end up
//!
//! This module handles:
//! - Draining the crawl channel into the document store (the sink writer)
//! - Reporting what the document store holds

mod sink;
pub mod stats;

pub use sink::{SinkReport, SinkWriter};
pub use stats::{load_statistics, print_statistics, StoreStatistics};
