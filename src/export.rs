//! CSV export of result sets.
//!
//! Pass-through collaborator: rows are serialized exactly as validated,
//! no reshaping. The bytes form backs the server download path.

use crate::error::Result;
use crate::record::PublicationRecord;
use std::path::Path;
use tracing::info;

/// Write a result set to a CSV file with the Scopus export header row.
pub fn write_csv(path: &Path, records: &[PublicationRecord]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(true).from_path(path)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    info!(path = %path.display(), rows = records.len(), "Saved CSV");
    Ok(())
}

/// Serialize a result set to CSV bytes (for download responses).
pub fn to_csv_bytes(records: &[PublicationRecord]) -> Result<Vec<u8>> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(Vec::new());
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.into_inner()
        .map_err(|e| crate::error::ScopusError::Config(format!("CSV buffer error: {}", e)))
}
