//! Scraper configuration.
//!
//! Every tunable lives in one explicit struct passed in at construction.
//! The library itself reads no environment variables; mapping flags or env
//! vars into this struct is the caller's job.

/// Credential pair enabling the authenticated login flow.
///
/// Presence toggles login before the first crawl; the library treats the
/// values as opaque.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Configuration for [`crate::Scraper`].
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Base URL of the target site.
    pub base_url: String,
    /// Host substring identifying content-image URLs.
    pub image_host: String,
    /// Launch the browser headless.
    pub headless: bool,
    /// Image count used when a request does not name one.
    pub default_limit: usize,
    /// Hard ceiling a request's count is clamped to.
    pub max_images: usize,
    /// Safety bound on scroll/extract cycles per crawl.
    pub max_scroll_passes: usize,
    /// Settle pause after each scroll, letting new content load.
    pub settle_ms: u64,
    /// Timeout for page navigations.
    pub nav_timeout_ms: u64,
    /// Bound on each wait step of the login flow.
    pub login_wait_ms: u64,
    /// Credentials for the optional login flow.
    pub credentials: Option<Credentials>,
    /// Number of reachability probes issued concurrently.
    pub probe_batch_size: usize,
    /// Per-probe timeout.
    pub probe_timeout_ms: u64,
    /// Pause between probe batches.
    pub batch_pause_ms: u64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.pinterest.com".to_string(),
            image_host: "pinimg.com".to_string(),
            headless: true,
            default_limit: 20,
            max_images: 100,
            max_scroll_passes: 10,
            settle_ms: 2000,
            nav_timeout_ms: 30_000,
            login_wait_ms: 10_000,
            credentials: None,
            probe_batch_size: 10,
            probe_timeout_ms: 5000,
            batch_pause_ms: 500,
        }
    }
}
