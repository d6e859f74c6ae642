//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the RecordStore trait.

use crate::model::{CrawlOutcome, ItemRecord};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{RecordStore, StorageError, StorageResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

/// SQLite record sink
///
/// Every persisted crawl becomes one row in `runs`; `load` reads back the
/// items of the newest run only.
pub struct SqliteStore {
    conn: Connection,
    path: Option<PathBuf>,
    config_hash: String,
}

impl SqliteStore {
    /// Opens (or creates) a database file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `config_hash` - Hash of the configuration, stamped on each run
    pub fn open(path: &Path, config_hash: impl Into<String>) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn,
            path: Some(path.to_path_buf()),
            config_hash: config_hash.into(),
        })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn,
            path: None,
            config_hash: "test".to_string(),
        })
    }

    /// Number of runs stored so far
    pub fn run_count(&self) -> StorageResult<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM runs", [], |row| row.get(0))?;
        Ok(count)
    }

    fn latest_run_id(&self) -> StorageResult<Option<i64>> {
        let id = self
            .conn
            .query_row("SELECT MAX(id) FROM runs", [], |row| row.get::<_, Option<i64>>(0))
            .optional()?
            .flatten();
        Ok(id)
    }
}

impl RecordStore for SqliteStore {
    fn persist(&mut self, outcome: CrawlOutcome) -> StorageResult<()> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO runs (started_at, config_hash) VALUES (?1, ?2)",
            params![Utc::now().to_rfc3339(), self.config_hash],
        )?;
        let run_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO items (run_id, title, category, price, rating)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;

            for record in &outcome.records {
                stmt.execute(params![
                    run_id,
                    record.title,
                    record.category,
                    record.price,
                    record.rating
                ])?;
            }
        }

        tx.execute(
            "UPDATE runs SET finished_at = ?1, record_count = ?2 WHERE id = ?3",
            params![
                Utc::now().to_rfc3339(),
                outcome.records.len() as i64,
                run_id
            ],
        )?;

        tx.commit()?;
        tracing::debug!("Stored run {} with {} records", run_id, outcome.records.len());
        Ok(())
    }

    fn load(&self) -> StorageResult<Vec<ItemRecord>> {
        let run_id = self
            .latest_run_id()?
            .ok_or_else(|| StorageError::NotFound(self.describe()))?;

        let mut stmt = self.conn.prepare(
            "SELECT title, category, price, rating FROM items WHERE run_id = ?1 ORDER BY id",
        )?;

        let records = stmt
            .query_map(params![run_id], |row| {
                Ok(ItemRecord {
                    title: row.get(0)?,
                    category: row.get(1)?,
                    price: row.get(2)?,
                    rating: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn describe(&self) -> String {
        match &self.path {
            Some(path) => format!("SQLite database {}", path.display()),
            None => "in-memory SQLite database".to_string(),
        }
    }
}
