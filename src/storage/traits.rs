//! Storage traits and error types
//!
//! This module defines the trait interface for document store backends and
//! associated error types.

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A sink for crawled documents
///
/// A store is bound to one collection. Inserts are independent: there are no
/// transactions, upserts or batch writes, and a failed insert leaves nothing
/// behind.
pub trait DocumentStore {
    /// Inserts one document and returns its id
    fn insert_one(&mut self, document: &serde_json::Value) -> StorageResult<i64>;
}
