//! Error taxonomy for the scraper.

/// Errors surfaced to callers of [`crate::Scraper`].
///
/// Per-item conditions (an unreadable DOM element, a probe that times out)
/// are handled inside their component and never appear here.
#[derive(thiserror::Error, Debug)]
pub enum ScrapeError {
    /// The browser driver could not be started. The session is reset so a
    /// later call may retry.
    #[error("browser initialization failed: {0}")]
    Initialization(String),

    /// The login flow did not complete. The session is torn down so no crawl
    /// proceeds with an indeterminate authentication state.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Any other error escaping a crawl, wrapping the underlying cause.
    #[error("scrape failed: {0}")]
    Failed(String),
}

/// Convenience result type.
pub type ScraperResult<T> = Result<T, ScrapeError>;
