//! Browser session module
//!
//! A session spans all pages of one run. The pipeline only depends on the
//! [`PageSession`] trait; [`BrowserSession`] is the real implementation on
//! top of headless Chrome, and tests drive the pipeline with scripted
//! sessions instead.
//!
//! Session lifetime follows scoped acquisition: the caller opens the
//! session, lends it to the pipeline, and the underlying browser process is
//! released when the session is dropped, on success and abort alike.

mod browser;

pub use browser::BrowserSession;

use std::time::Duration;

/// One browser-automation lifetime spanning all pages of a run
pub trait PageSession {
    /// Navigates to `url` and waits for the load to settle
    ///
    /// A timeout here is fatal for the run: the pipeline aborts rather
    /// than skipping the page.
    fn navigate(&mut self, url: &str) -> crate::Result<()>;

    /// Waits up to `timeout` for an element matching `selector`
    ///
    /// Returns `Ok(false)` when the wait expires; missing content is
    /// tolerated and handled by the caller, unlike a navigation failure.
    fn wait_for(&mut self, selector: &str, timeout: Duration) -> crate::Result<bool>;

    /// Returns the current page HTML
    fn content(&mut self) -> crate::Result<String>;
}
