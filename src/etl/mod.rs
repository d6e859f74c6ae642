//! Cleaning stage
//!
//! Reads the raw records of the latest crawl back from a record store,
//! normalizes price, rating and title, and writes a semicolon-separated
//! file for downstream analysis.

mod load;
mod transform;

pub use load::{write_csv, write_csv_to, CSV_DELIMITER};
pub use transform::{
    clean_price, clean_record, rating_to_number, repair_title, transform, CleanRecord,
};

use crate::storage::RecordStore;
use crate::TrawlError;
use std::path::Path;
use thiserror::Error;

/// Errors raised while cleaning or writing records
#[derive(Debug, Error)]
pub enum EtlError {
    #[error("Unparseable price '{value}' for '{title}'")]
    Price { title: String, value: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Runs extract, transform and load against `store`
///
/// # Returns
///
/// * `Ok(usize)` - Number of rows written
/// * `Err(TrawlError)` - The store could not be read or a record could not be cleaned
pub fn run_etl(store: &dyn RecordStore, processed_path: &Path) -> Result<usize, TrawlError> {
    tracing::info!("Starting cleaning stage from {}", store.describe());

    let raw = store.load()?;
    tracing::debug!("Extracted {} raw records", raw.len());

    let cleaned = transform(&raw)?;
    write_csv(processed_path, &cleaned)?;

    tracing::info!(
        "Cleaning stage wrote {} rows to {}",
        cleaned.len(),
        processed_path.display()
    );
    Ok(cleaned.len())
}
