//! CSV export of stored products
//!
//! Writes every product row, in insertion order, to a flat delimited file
//! for downstream analysis.

use crate::storage::ProductStore;
use crate::ScrapeError;
use std::path::Path;

/// Exports all stored products to a CSV file
///
/// # Arguments
///
/// * `store` - The product store to read from
/// * `path` - Destination file; overwritten if it exists
///
/// # Returns
///
/// * `Ok(usize)` - Number of rows written
/// * `Err(ScrapeError)` - Failed to read the store or write the file
pub fn export_csv(store: &dyn ProductStore, path: &Path) -> Result<usize, ScrapeError> {
    let records = store.fetch_all()?;

    let mut writer = csv::Writer::from_path(path)?;
    for record in &records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(records.len())
}
