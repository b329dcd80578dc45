use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Immutable configuration for a single scrape run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Path to the SQLite database file
    pub database_path: PathBuf,

    /// Maximum number of result pages to visit
    pub max_pages: u32,

    /// Run the browser in headless mode
    pub headless: bool,

    /// Pause between page navigations
    pub request_delay: Duration,

    /// Base URL of the target site, used to build search URLs and
    /// resolve relative image links
    pub base_url: Url,
}
