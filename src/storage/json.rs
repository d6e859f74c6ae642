//! JSON file storage implementation

use crate::model::{CrawlOutcome, ItemRecord};
use crate::storage::traits::{RecordStore, StorageError, StorageResult};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes the raw records of a run as one pretty-printed JSON array
///
/// Each persist replaces the file wholesale.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Serializes `records` with a four-space indent
fn to_indented_json(records: &[ItemRecord]) -> StorageResult<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    records.serialize(&mut serializer)?;
    Ok(buf)
}

impl RecordStore for JsonFileStore {
    fn persist(&mut self, outcome: CrawlOutcome) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = to_indented_json(&outcome.records)?;
        fs::write(&self.path, json)?;

        tracing::debug!(
            "Wrote {} records to {}",
            outcome.records.len(),
            self.path.display()
        );
        Ok(())
    }

    fn load(&self) -> StorageResult<Vec<ItemRecord>> {
        if !self.path.exists() {
            return Err(StorageError::NotFound(self.path.display().to_string()));
        }

        let content = fs::read_to_string(&self.path)?;
        let records = serde_json::from_str(&content)?;
        Ok(records)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
