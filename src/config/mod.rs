//! Configuration module for kartminer
//!
//! Run configuration is resolved once from environment variables (with a
//! `.env` file honored when present) and is immutable for the duration of
//! a run.
//!
//! # Example
//!
//! ```no_run
//! use kartminer::config::load_from_env;
//!
//! let config = load_from_env().unwrap();
//! println!("Scraping up to {} pages", config.max_pages);
//! ```

mod env;
mod types;

pub use env::{
    from_lookup, load_from_env, DEFAULT_BASE_URL, DEFAULT_DATABASE_PATH, DEFAULT_HEADLESS,
    DEFAULT_MAX_PAGES, DEFAULT_REQUEST_DELAY_SECS,
};
pub use types::RunConfig;
