//! Kartminer: a product-listing scraper
//!
//! This crate drives a headless browser through paginated e-commerce
//! search-result pages, extracts product listings (title, image URL, price)
//! with defensive selector fallbacks, and persists them to a local SQLite store.

pub mod config;
pub mod output;
pub mod pipeline;
pub mod session;
pub mod storage;

use thiserror::Error;

/// Main error type for kartminer operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser session error: {0}")]
    Session(String),

    #[error("Navigation failed for {url}: {message}")]
    Navigation { url: String, message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?} ({message})")]
    InvalidValue {
        key: &'static str,
        value: String,
        message: String,
    },

    #[error("Invalid base URL {url:?}: {message}")]
    InvalidBaseUrl { url: String, message: String },
}

/// Result type alias for kartminer operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::RunConfig;
pub use pipeline::{DataPolicy, Pipeline, RunFailure, RunSummary};
pub use session::PageSession;
pub use storage::{NewProduct, ProductRecord, ProductStore, SqliteStore};
