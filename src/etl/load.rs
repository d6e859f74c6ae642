//! CSV output for cleaned records

use crate::etl::transform::CleanRecord;
use crate::etl::EtlError;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Field separator of the processed file
pub const CSV_DELIMITER: u8 = b';';

/// Writes `records` as semicolon-separated values with a header row
pub fn write_csv_to<W: Write>(writer: W, records: &[CleanRecord]) -> Result<(), EtlError> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(CSV_DELIMITER)
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(["title", "category", "price", "rating"])?;
    for record in records {
        wtr.serialize(record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes the processed file, creating its parent directories
pub fn write_csv(path: &Path, records: &[CleanRecord]) -> Result<(), EtlError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file = fs::File::create(path)?;
    write_csv_to(file, records)
}
