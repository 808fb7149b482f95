//! Crawl orchestration.
//!
//! [`Scraper`] composes the session, collector, classifier, and validator
//! into one `scrape` operation. Crawls against a session are serialized by
//! the session lease; validation runs after the lease is released so the
//! browser is free for the next caller.

use crate::classify::UrlClassifier;
use crate::collect::ScrollCollector;
use crate::config::ScraperConfig;
use crate::driver::chromium::ChromiumLauncher;
use crate::driver::DriverLauncher;
use crate::error::{ScrapeError, ScraperResult};
use crate::session::BrowserSession;
use crate::validate::ReachabilityValidator;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use url::Url;

/// One crawl request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScrapeRequest {
    /// Search term; when absent the landing feed is crawled.
    pub category: Option<String>,
    /// Requested image count; clamped to the configured maximum.
    pub limit: usize,
}

/// Result of one crawl.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeResult {
    /// The request's category, echoed back.
    pub category: Option<String>,
    /// Number of images returned.
    pub total_images: usize,
    /// Reachable image URLs in discovery order, at most the requested count.
    pub images: Vec<String>,
    /// Wall-clock duration of the crawl.
    pub elapsed_seconds: f64,
}

/// The crawler. Reusable across scrape calls; one browser session is shared
/// by all of them.
pub struct Scraper {
    config: Arc<ScraperConfig>,
    session: BrowserSession,
    classifier: UrlClassifier,
    validator: ReachabilityValidator,
}

impl Scraper {
    /// Build a scraper backed by a headless Chromium driver.
    pub fn new(config: ScraperConfig) -> Self {
        let launcher = Arc::new(ChromiumLauncher::new(config.headless));
        Self::with_launcher(config, launcher)
    }

    /// Build a scraper with an injected driver launcher.
    pub fn with_launcher(config: ScraperConfig, launcher: Arc<dyn DriverLauncher>) -> Self {
        let classifier = UrlClassifier::new(&config.image_host);
        let validator = ReachabilityValidator::new(&config);
        let config = Arc::new(config);
        let session = BrowserSession::new(launcher, Arc::clone(&config));
        Self {
            config,
            session,
            classifier,
            validator,
        }
    }

    /// Crawl once and return the reachable images.
    ///
    /// Initialization and authentication failures surface typed; any other
    /// error escaping the crawl is wrapped as [`ScrapeError::Failed`]. The
    /// session stays alive for reuse unless setup itself failed.
    pub async fn scrape(&self, request: &ScrapeRequest) -> ScraperResult<ScrapeResult> {
        let started = Instant::now();
        let limit = self.effective_limit(request.limit);
        let target_url = self.target_url(request)?;

        let collected = {
            let mut lease = self.session.lease().await?;
            let driver = lease.driver();

            info!("navigating to {target_url}");
            driver
                .navigate(&target_url, self.config.nav_timeout_ms)
                .await
                .map_err(|e| ScrapeError::Failed(format!("{e:#}")))?;

            ScrollCollector::new(driver, &self.classifier, &self.config)
                .collect(limit)
                .await
                .map_err(|e| ScrapeError::Failed(format!("{e:#}")))?
        };
        info!("collected {} candidate images", collected.len());

        let verdicts = self.validator.validate(&collected).await;
        let images: Vec<String> = verdicts
            .into_iter()
            .filter(|v| v.reachable)
            .map(|v| v.url)
            .take(limit)
            .collect();

        Ok(ScrapeResult {
            category: request.category.clone(),
            total_images: images.len(),
            images,
            elapsed_seconds: started.elapsed().as_secs_f64(),
        })
    }

    /// Release the browser session. Safe to call multiple times; the next
    /// scrape starts a fresh session.
    pub async fn shutdown(&self) {
        self.session.close().await;
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    fn effective_limit(&self, requested: usize) -> usize {
        let requested = if requested == 0 {
            self.config.default_limit
        } else {
            requested
        };
        requested.clamp(1, self.config.max_images)
    }

    /// Search results for the request's category, or the landing feed.
    fn target_url(&self, request: &ScrapeRequest) -> ScraperResult<String> {
        let base = Url::parse(&self.config.base_url)
            .map_err(|e| ScrapeError::Failed(format!("invalid base URL: {e}")))?;

        match request.category.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let mut url = base
                    .join("search/pins/")
                    .map_err(|e| ScrapeError::Failed(format!("invalid search URL: {e}")))?;
                url.query_pairs_mut().append_pair("q", term);
                Ok(url.to_string())
            }
            _ => Ok(base.to_string()),
        }
    }
}
