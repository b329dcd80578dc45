//! Headless Chrome session implementation
//!
//! Wraps the `headless_chrome` crate behind the [`PageSession`] trait:
//! one browser process, one tab, driven synchronously.

use crate::config::RunConfig;
use crate::session::PageSession;
use crate::ScrapeError;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;

/// Chrome flags matching the original scraper's launch profile
const CHROME_ARGS: &[&str] = &["--no-sandbox", "--disable-dev-shm-usage", "--disable-gpu"];

/// Desktop user agent presented to the target site
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko)";

/// Per-navigation timeout
const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(15);

/// A live headless-Chrome session
///
/// The browser process is torn down when this value is dropped, so owning
/// a `BrowserSession` is owning the resource: every exit path releases it.
pub struct BrowserSession {
    // Held so the browser process outlives the tab
    _browser: Browser,
    tab: Arc<Tab>,
}

impl BrowserSession {
    /// Launches a browser and opens the tab used for the whole run
    ///
    /// # Arguments
    ///
    /// * `config` - Run configuration (headless flag)
    ///
    /// # Returns
    ///
    /// * `Ok(BrowserSession)` - Browser launched and tab ready
    /// * `Err(ScrapeError::Session)` - Chrome could not be launched
    pub fn open(config: &RunConfig) -> crate::Result<Self> {
        let options = LaunchOptions::default_builder()
            .headless(config.headless)
            .window_size(Some((1920, 1080)))
            .args(CHROME_ARGS.iter().map(OsStr::new).collect())
            .build()
            .map_err(|e| ScrapeError::Session(format!("invalid launch options: {}", e)))?;

        let browser = Browser::new(options)
            .map_err(|e| ScrapeError::Session(format!("failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| ScrapeError::Session(format!("failed to open tab: {}", e)))?;

        tab.set_default_timeout(NAVIGATION_TIMEOUT);

        if let Err(e) = tab.set_user_agent(USER_AGENT, None, None) {
            tracing::warn!("Could not set user agent: {}", e);
        }

        Ok(Self {
            _browser: browser,
            tab,
        })
    }
}

impl PageSession for BrowserSession {
    fn navigate(&mut self, url: &str) -> crate::Result<()> {
        self.tab
            .navigate_to(url)
            .map_err(|e| ScrapeError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| ScrapeError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        Ok(())
    }

    fn wait_for(&mut self, selector: &str, timeout: Duration) -> crate::Result<bool> {
        // The wait expiring is not an error for the caller; the page is
        // simply treated as having no matching content.
        match self.tab.wait_for_element_with_custom_timeout(selector, timeout) {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::debug!("Wait for {:?} ended without a match: {}", selector, e);
                Ok(false)
            }
        }
    }

    fn content(&mut self) -> crate::Result<String> {
        self.tab
            .get_content()
            .map_err(|e| ScrapeError::Session(format!("failed to read page content: {}", e)))
    }
}
