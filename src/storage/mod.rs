//! Storage module for persisting crawl results
//!
//! This module owns every sink the crawl can hand its records to:
//! - A JSON file holding the raw records of the latest run (default)
//! - An SQLite database that keeps one row per run plus its items

mod json;
mod schema;
mod sqlite;
mod traits;

pub use json::JsonFileStore;
pub use sqlite::SqliteStore;
pub use traits::{RecordStore, StorageError, StorageResult};

use crate::config::{OutputConfig, SinkKind};
use std::path::Path;

/// Opens the sink selected in the output configuration
///
/// # Arguments
///
/// * `output` - Output section of the configuration
/// * `config_hash` - Hash of the configuration file, recorded by sinks that track runs
pub fn open_store(
    output: &OutputConfig,
    config_hash: &str,
) -> StorageResult<Box<dyn RecordStore>> {
    let store: Box<dyn RecordStore> = match output.sink {
        SinkKind::Json => Box::new(JsonFileStore::new(&output.raw_path)),
        SinkKind::Sqlite => Box::new(SqliteStore::open(
            Path::new(&output.database_path),
            config_hash,
        )?),
    };

    tracing::debug!("Using record store: {}", store.describe());
    Ok(store)
}
