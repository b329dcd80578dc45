//! Storage module for persisting scraped products
//!
//! This module owns the SQLite store that records every product extracted
//! by the pipeline:
//! - Schema initialization on open
//! - Validated single and batched (transactional) inserts
//! - Recency- and insertion-ordered reads for the viewer and CSV export
//!
//! Products are never mutated after insertion; the only destructive
//! operation is [`ProductStore::clear`], used when a run starts fresh.
//! No natural key is enforced, so re-scraping without clearing appends
//! duplicate rows for identical products. That is the documented
//! keep-policy behavior, not an accident.

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{ProductStore, StorageError, StorageResult};

use crate::ScrapeError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

/// Opens (creating if necessary) a product store at the given path
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStore)` - Successfully initialized store
/// * `Err(ScrapeError)` - The location is unreachable or unwritable
pub fn open_store(path: &Path) -> Result<SqliteStore, ScrapeError> {
    Ok(SqliteStore::open(path)?)
}

/// A product extracted by the pipeline, not yet persisted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewProduct {
    /// Product title; required, non-empty after trimming
    pub title: String,

    /// Image URL; optional, stored as an empty string when absent
    pub image_url: Option<String>,

    /// Display price string; required, non-empty after trimming.
    /// Kept as text because source formatting varies too much to parse.
    pub price: String,

    /// Insertion timestamp; assigned by the store when `None`
    pub created_at: Option<DateTime<Utc>>,
}

/// A product row as persisted in the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductRecord {
    pub id: i64,
    pub title: String,
    pub image_url: String,
    pub price: String,
    pub created_at: String,
}
