//! SQLite storage implementation
//!
//! This module provides the SQLite-based implementation of the
//! [`ProductStore`] trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ProductStore, StorageError, StorageResult};
use crate::storage::{NewProduct, ProductRecord};
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (creating if necessary) a store at the given path
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StorageError::Init)` - The location is unreachable or unwritable
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| StorageError::Init(format!("{}: {}", path.display(), e)))?;

        // Configure SQLite for better write behavior
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )
        .map_err(|e| StorageError::Init(e.to_string()))?;

        initialize_schema(&conn).map_err(|e| StorageError::Init(e.to_string()))?;

        Ok(Self { conn })
    }

    /// Creates an in-memory store (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| StorageError::Init(e.to_string()))?;
        initialize_schema(&conn).map_err(|e| StorageError::Init(e.to_string()))?;
        Ok(Self { conn })
    }
}

/// Validates required fields and inserts one product row
///
/// Shared between single and batched inserts so both apply identical
/// semantics; `conn` may be a plain connection or an open transaction.
fn insert_product(conn: &Connection, product: &NewProduct) -> StorageResult<i64> {
    let title = product.title.trim();
    if title.is_empty() {
        return Err(StorageError::Validation { field: "title" });
    }

    let price = product.price.trim();
    if price.is_empty() {
        return Err(StorageError::Validation { field: "price" });
    }

    let image_url = product
        .image_url
        .as_deref()
        .map(str::trim)
        .unwrap_or_default();

    let created_at = product
        .created_at
        .unwrap_or_else(Utc::now)
        .to_rfc3339();

    conn.execute(
        "INSERT INTO product_info (title, image_url, price, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![title, image_url, price, created_at],
    )?;

    Ok(conn.last_insert_rowid())
}

/// Maps a full product row to a [`ProductRecord`]
fn record_from_row(row: &Row<'_>) -> rusqlite::Result<ProductRecord> {
    Ok(ProductRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        image_url: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        price: row.get(3)?,
        created_at: row.get(4)?,
    })
}

impl ProductStore for SqliteStore {
    fn clear(&mut self) -> StorageResult<()> {
        self.conn.execute("DELETE FROM product_info", [])?;
        Ok(())
    }

    fn insert_one(&mut self, product: &NewProduct) -> StorageResult<i64> {
        insert_product(&self.conn, product)
    }

    fn insert_many(&mut self, products: &[NewProduct]) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;

        for product in products {
            insert_product(&tx, product)?;
        }

        tx.commit()?;
        Ok(products.len())
    }

    fn fetch_recent(&self, limit: usize) -> StorageResult<Vec<ProductRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, image_url, price, created_at FROM product_info
             ORDER BY id DESC LIMIT ?1",
        )?;

        let records = stmt
            .query_map(params![limit as i64], record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn fetch_all(&self) -> StorageResult<Vec<ProductRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, image_url, price, created_at FROM product_info
             ORDER BY id ASC",
        )?;

        let records = stmt
            .query_map([], record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn count(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM product_info", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_with_price(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM product_info WHERE price IS NOT NULL AND price != ''",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_with_image(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM product_info WHERE image_url IS NOT NULL AND image_url != ''",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}
