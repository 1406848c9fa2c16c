//! Statistics generation from the document database
//!
//! This module provides functionality for extracting and displaying
//! per-collection document counts.

use crate::storage::{SqliteDocumentStore, StorageResult};
use std::collections::BTreeMap;

/// Document counts across the database
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStatistics {
    /// Total number of documents in every collection
    pub total_documents: u64,

    /// Count of documents by collection, sorted by name
    pub by_collection: BTreeMap<String, u64>,
}

/// Loads statistics from storage
pub fn load_statistics(store: &SqliteDocumentStore) -> StorageResult<StoreStatistics> {
    let by_collection = store.collection_counts()?;
    let total_documents = by_collection.values().sum();

    Ok(StoreStatistics {
        total_documents,
        by_collection,
    })
}

/// Prints statistics to stdout
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Document Store Statistics ===\n");
    println!("Total documents: {}", stats.total_documents);

    if stats.by_collection.is_empty() {
        println!("\nNo collections yet.");
        return;
    }

    println!("\nDocuments by collection:");
    for (collection, count) in &stats.by_collection {
        println!("  {:20} {}", collection, count);
    }
}
