//! Extraction pipeline: drives a browser session across result pages
//!
//! The pipeline walks up to `max_pages` search-result pages through a
//! [`PageSession`], extracts and validates product cards, and hands the
//! full accumulated batch to the store in one transaction at the end of
//! the run. Batching keeps the write atomic: a run either contributes all
//! of its completed pages or (before any page finished) nothing.
//!
//! Failure policy follows a strict split:
//! - session and navigation failures are fatal: the run aborts rather
//!   than skipping a page, since partial multi-page results are worse
//!   than a clear failure signal
//! - missing containers and rejected cards are absorbed, logged and
//!   counted, and the run continues

mod extract;

pub use extract::{
    looks_like_price, CardExtractor, CardSkip, FieldExtractor, PageExtraction,
    CARD_WAIT_SELECTOR, UNKNOWN_TITLE,
};

use crate::config::RunConfig;
use crate::session::PageSession;
use crate::storage::{NewProduct, ProductStore};
use crate::ScrapeError;
use std::fmt;
use std::time::{Duration, Instant};
use url::Url;

/// Bounded wait for the product-card container after navigation
const CARD_WAIT_TIMEOUT: Duration = Duration::from_secs(15);

/// Run-start policy for data already in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataPolicy {
    /// Clear existing rows before scraping
    Fresh,

    /// Append to existing rows; duplicates are possible
    Keep,
}

/// Pipeline stages, in the order a successful run passes through them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    SessionOpen,
    PageLoading,
    Extracting,
    Flushing,
    SessionClosed,
    Aborted,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::SessionOpen => "session-open",
            Self::PageLoading => "page-loading",
            Self::Extracting => "extracting",
            Self::Flushing => "flushing",
            Self::SessionClosed => "session-closed",
            Self::Aborted => "aborted",
        };
        write!(f, "{}", name)
    }
}

/// Per-run counters reported at the end of a run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Pages that completed extraction
    pub pages_processed: u32,

    /// Valid products accumulated across all pages
    pub products_extracted: u32,

    /// Cards rejected during validation
    pub products_skipped: u32,

    /// Rows actually committed to the store
    pub products_stored: u32,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

/// A fatal pipeline failure
///
/// Carries the run summary when at least one page completed before the
/// abort, so callers can still report what was done (and what was
/// persisted) alongside the error.
#[derive(Debug)]
pub struct RunFailure {
    pub error: ScrapeError,
    pub summary: Option<RunSummary>,
}

/// The extraction pipeline
///
/// Borrows an open session and a store for the duration of one run; the
/// caller keeps ownership, so both are released on every exit path.
pub struct Pipeline<'a, S: PageSession, T: ProductStore> {
    session: &'a mut S,
    store: &'a mut T,
    config: &'a RunConfig,
    extractor: CardExtractor,
    stage: Stage,
}

impl<'a, S: PageSession, T: ProductStore> Pipeline<'a, S, T> {
    /// Creates a pipeline over an open session and store
    pub fn new(session: &'a mut S, store: &'a mut T, config: &'a RunConfig) -> Self {
        Self {
            session,
            store,
            config,
            extractor: CardExtractor::new(),
            stage: Stage::Idle,
        }
    }

    /// Runs the scrape: navigate, extract and validate each page, then
    /// flush the accumulated batch in one transaction
    ///
    /// # Arguments
    ///
    /// * `query` - Search keyword used to build result-page URLs
    /// * `policy` - Whether to clear existing rows before scraping
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - Run completed (possibly with zero products)
    /// * `Err(RunFailure)` - Fatal session, navigation or storage failure
    pub fn run(mut self, query: &str, policy: DataPolicy) -> Result<RunSummary, RunFailure> {
        let started = Instant::now();
        self.enter(Stage::SessionOpen);
        tracing::info!(
            "Starting run: query {:?}, up to {} pages",
            query,
            self.config.max_pages
        );

        if policy == DataPolicy::Fresh {
            tracing::info!("Fresh run requested, clearing existing products");
            if let Err(e) = self.store.clear() {
                self.enter(Stage::Aborted);
                return Err(RunFailure {
                    error: e.into(),
                    summary: None,
                });
            }
        }

        let mut summary = RunSummary::default();
        let mut batch: Vec<NewProduct> = Vec::new();

        for page in 1..=self.config.max_pages {
            self.enter(Stage::PageLoading);
            let url = match search_url(&self.config.base_url, query, page) {
                Ok(url) => url,
                Err(e) => return Err(self.abort(e.into(), summary, batch, started)),
            };

            tracing::info!("Loading page {} of {}: {}", page, self.config.max_pages, url);
            if let Err(e) = self.session.navigate(url.as_str()) {
                return Err(self.abort(e, summary, batch, started));
            }

            self.enter(Stage::Extracting);
            let container_present = match self.session.wait_for(CARD_WAIT_SELECTOR, CARD_WAIT_TIMEOUT)
            {
                Ok(present) => present,
                Err(e) => return Err(self.abort(e, summary, batch, started)),
            };
            if !container_present {
                // Layout variants exist; a missing container only means
                // this page yields nothing
                tracing::warn!("No product container on page {}, treating as empty", page);
            }

            let html = match self.session.content() {
                Ok(html) => html,
                Err(e) => return Err(self.abort(e, summary, batch, started)),
            };

            let extraction = self.extractor.extract_page(&html, &self.config.base_url);
            for skip in &extraction.skipped {
                tracing::warn!("Skipping card on page {}: {}", page, skip);
            }

            summary.pages_processed += 1;
            summary.products_extracted += extraction.products.len() as u32;
            summary.products_skipped += extraction.skipped.len() as u32;
            tracing::info!(
                "Page {}: {} products extracted, {} skipped",
                page,
                extraction.products.len(),
                extraction.skipped.len()
            );
            batch.extend(extraction.products);

            if page == self.config.max_pages {
                break;
            }
            if !extraction.has_next {
                tracing::info!("No pagination control on page {}, stopping early", page);
                break;
            }
            if !self.config.request_delay.is_zero() {
                std::thread::sleep(self.config.request_delay);
            }
        }

        self.enter(Stage::Flushing);
        let stored = match self.flush(&batch) {
            Ok(stored) => stored,
            Err(e) => return Err(self.abort(e, summary, Vec::new(), started)),
        };
        summary.products_stored = stored;

        self.enter(Stage::SessionClosed);
        summary.elapsed = started.elapsed();
        tracing::info!(
            "Run complete: {} pages processed, {} products stored, {} skipped",
            summary.pages_processed,
            summary.products_stored,
            summary.products_skipped
        );
        Ok(summary)
    }

    /// Writes the accumulated batch in a single transaction
    fn flush(&mut self, batch: &[NewProduct]) -> Result<u32, ScrapeError> {
        if batch.is_empty() {
            tracing::info!("No products accumulated, nothing to store");
            return Ok(0);
        }

        let stored = self.store.insert_many(batch)?;
        Ok(stored as u32)
    }

    /// Aborts the run after a fatal error
    ///
    /// When at least one page completed, the accumulated batch is still
    /// flushed and the summary attached to the failure, so completed work
    /// is neither lost nor misreported.
    fn abort(
        &mut self,
        error: ScrapeError,
        mut summary: RunSummary,
        batch: Vec<NewProduct>,
        started: Instant,
    ) -> RunFailure {
        self.enter(Stage::Aborted);
        tracing::error!("Run aborted: {}", error);

        if summary.pages_processed == 0 {
            return RunFailure {
                error,
                summary: None,
            };
        }

        if !batch.is_empty() {
            match self.store.insert_many(&batch) {
                Ok(stored) => summary.products_stored = stored as u32,
                Err(e) => tracing::error!("Failed to flush batch after abort: {}", e),
            }
        }

        summary.elapsed = started.elapsed();
        RunFailure {
            error,
            summary: Some(summary),
        }
    }

    /// Records a stage transition
    fn enter(&mut self, stage: Stage) {
        if self.stage != stage {
            tracing::info!("Stage transition: {} -> {}", self.stage, stage);
            self.stage = stage;
        }
    }
}

/// Builds the search URL for a result page
///
/// Page 1 carries only the query; later pages add an explicit page number.
pub fn search_url(base: &Url, query: &str, page: u32) -> Result<Url, url::ParseError> {
    let mut url = base.join("search")?;
    url.query_pairs_mut().append_pair("q", query);
    if page > 1 {
        url.query_pairs_mut().append_pair("page", &page.to_string());
    }
    Ok(url)
}
