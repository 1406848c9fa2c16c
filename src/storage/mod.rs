//! Storage module for persisting crawled documents
//!
//! This module handles all database operations for the crawler:
//! - SQLite database initialization and schema management
//! - One-document-at-a-time inserts into a named collection
//! - Read helpers used by the statistics report

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteDocumentStore;
pub use traits::{DocumentStore, StorageError, StorageResult};
