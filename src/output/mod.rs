//! Output module for the stored-product viewer
//!
//! This module renders what the store currently holds:
//! - A console summary of the most recent products and store statistics
//! - CSV export of the full product table

mod export;

pub use export::export_csv;

use crate::storage::{ProductRecord, ProductStore, StorageResult};

/// Store statistics shown by the viewer
#[derive(Debug, Clone)]
pub struct StoreStats {
    /// Total number of product rows
    pub total: u64,

    /// Rows with a non-empty price
    pub with_price: u64,

    /// Rows with a non-empty image URL
    pub with_image: u64,
}

/// Loads statistics from the store
///
/// # Arguments
///
/// * `store` - The product store to query
///
/// # Returns
///
/// * `Ok(StoreStats)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query the store
pub fn load_stats(store: &dyn ProductStore) -> StorageResult<StoreStats> {
    Ok(StoreStats {
        total: store.count()?,
        with_price: store.count_with_price()?,
        with_image: store.count_with_image()?,
    })
}

/// Prints store statistics to stdout
pub fn print_stats(stats: &StoreStats) {
    println!("Store Statistics:");
    println!("  Total products: {}", stats.total);
    println!("  With price: {}", stats.with_price);
    println!("  With image: {}", stats.with_image);
    println!();
}

/// Prints the given records as a latest-first listing
pub fn print_recent(records: &[ProductRecord]) {
    if records.is_empty() {
        println!("No products stored yet.");
        return;
    }

    println!("Latest {} products:", records.len());
    for record in records {
        let image = if record.image_url.is_empty() {
            "-"
        } else {
            record.image_url.as_str()
        };
        println!(
            "  [{}] {} | {} | {} | {}",
            record.id, record.title, record.price, image, record.created_at
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{NewProduct, SqliteStore};

    #[test]
    fn test_load_stats_counts_field_presence() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        store
            .insert_one(&NewProduct {
                title: "With image".to_string(),
                image_url: Some("https://img.test/a.jpg".to_string()),
                price: "₹100".to_string(),
                created_at: None,
            })
            .unwrap();
        store
            .insert_one(&NewProduct {
                title: "Without image".to_string(),
                image_url: None,
                price: "₹200".to_string(),
                created_at: None,
            })
            .unwrap();

        let stats = load_stats(&store).unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.with_price, 2);
        assert_eq!(stats.with_image, 1);
    }

    #[test]
    fn test_load_stats_on_empty_store() {
        let store = SqliteStore::new_in_memory().unwrap();
        let stats = load_stats(&store).unwrap();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.with_price, 0);
        assert_eq!(stats.with_image, 0);
    }
}
