//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the DocumentStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{DocumentStore, StorageResult};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::path::Path;

/// SQLite document store bound to one collection
pub struct SqliteDocumentStore {
    conn: Connection,
    collection: String,
}

impl SqliteDocumentStore {
    /// Opens (or creates) the database at `path`, writing to `collection`
    ///
    /// Missing parent directories are created.
    pub fn open(path: &Path, collection: &str) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn,
            collection: collection.to_string(),
        })
    }

    /// Creates an in-memory database
    pub fn open_in_memory(collection: &str) -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn,
            collection: collection.to_string(),
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Number of documents in this store's collection
    pub fn count(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE collection = ?1",
            params![self.collection],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// All documents of this store's collection, in insertion order
    pub fn documents(&self) -> StorageResult<Vec<serde_json::Value>> {
        let mut stmt = self
            .conn
            .prepare("SELECT body FROM documents WHERE collection = ?1 ORDER BY id")?;

        let bodies = stmt
            .query_map(params![self.collection], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut documents = Vec::with_capacity(bodies.len());
        for body in bodies {
            documents.push(serde_json::from_str(&body)?);
        }
        Ok(documents)
    }

    /// Document counts for every collection in the database
    pub fn collection_counts(&self) -> StorageResult<BTreeMap<String, u64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT collection, COUNT(*) FROM documents GROUP BY collection")?;

        let counts = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(counts)
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn insert_one(&mut self, document: &serde_json::Value) -> StorageResult<i64> {
        let body = serde_json::to_string(document)?;
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO documents (collection, body, inserted_at) VALUES (?1, ?2, ?3)",
            params![self.collection, body, now],
        )?;
        Ok(self.conn.last_insert_rowid())
    }
}
