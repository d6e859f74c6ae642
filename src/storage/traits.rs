//! Storage traits and error types
//!
//! This module defines the trait interface for record sinks and
//! associated error types.

use crate::model::{CrawlOutcome, ItemRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("No stored records found at {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A destination for the records of a finished crawl
///
/// The crawl hands its outcome over exactly once, after every category has
/// been walked. The cleaning stage reads the same records back via `load`.
pub trait RecordStore: Send {
    /// Persists the records of one run
    fn persist(&mut self, outcome: CrawlOutcome) -> StorageResult<()>;

    /// Loads the most recently persisted records, in persisted order
    fn load(&self) -> StorageResult<Vec<ItemRecord>>;

    /// Where the records go, for log and console output
    fn describe(&self) -> String;
}
