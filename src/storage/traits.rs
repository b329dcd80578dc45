//! Storage trait and error types
//!
//! This module defines the trait interface for the product store and its
//! associated error types.

use crate::storage::{NewProduct, ProductRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to initialize store: {0}")]
    Init(String),

    #[error("Validation error: {field} must be non-empty")]
    Validation { field: &'static str },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for the product store backend
///
/// This trait defines all database operations needed by the pipeline and
/// the viewer. The store is the sole writer and reader of the persistent
/// data; no in-memory cache sits in front of it, so callers always see the
/// latest committed state.
pub trait ProductStore {
    /// Deletes all existing product rows
    ///
    /// Used only when a run starts fresh. A no-op on an empty store.
    fn clear(&mut self) -> StorageResult<()>;

    /// Validates and inserts a single product
    ///
    /// `title` and `price` must be non-empty after trimming. A missing
    /// `image_url` is stored as an empty string, and a missing
    /// `created_at` is assigned the current time.
    ///
    /// # Returns
    ///
    /// The id of the newly inserted row
    fn insert_one(&mut self, product: &NewProduct) -> StorageResult<i64>;

    /// Inserts a batch of products in a single transaction
    ///
    /// Applies [`ProductStore::insert_one`] semantics to each record.
    /// Either every row commits or none do: a validation or write failure
    /// anywhere in the batch rolls the whole transaction back.
    ///
    /// # Returns
    ///
    /// The number of rows inserted
    fn insert_many(&mut self, products: &[NewProduct]) -> StorageResult<usize>;

    /// Returns up to `limit` products, most recently inserted first
    ///
    /// Returns fewer rows if the store holds fewer, and an empty vector
    /// for an empty store.
    fn fetch_recent(&self, limit: usize) -> StorageResult<Vec<ProductRecord>>;

    /// Returns every product in insertion order, for export use
    fn fetch_all(&self) -> StorageResult<Vec<ProductRecord>>;

    /// Counts all product rows
    fn count(&self) -> StorageResult<u64>;

    /// Counts product rows with a non-empty price
    fn count_with_price(&self) -> StorageResult<u64>;

    /// Counts product rows with a non-empty image URL
    fn count_with_image(&self) -> StorageResult<u64>;
}
