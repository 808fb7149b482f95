//! Scroll-driven collection of candidate image URLs.

use crate::classify::UrlClassifier;
use crate::config::ScraperConfig;
use crate::driver::BrowserDriver;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight);";
const PAGE_HEIGHT: &str = "document.body.scrollHeight";

/// Ordered set of normalized image URLs.
///
/// Insertion order is discovery order; membership is checked before
/// insertion so the same URL is never counted twice.
#[derive(Debug, Default)]
pub struct PinSet {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl PinSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a URL, returning whether it was new.
    pub fn insert(&mut self, url: String) -> bool {
        if self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.order.push(url);
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The URLs in discovery order.
    pub fn into_vec(self) -> Vec<String> {
        self.order
    }
}

/// Drives the scroll → settle → extract loop against a live page.
pub struct ScrollCollector<'a> {
    driver: &'a mut dyn BrowserDriver,
    classifier: &'a UrlClassifier,
    config: &'a ScraperConfig,
}

impl<'a> ScrollCollector<'a> {
    pub fn new(
        driver: &'a mut dyn BrowserDriver,
        classifier: &'a UrlClassifier,
        config: &'a ScraperConfig,
    ) -> Self {
        Self {
            driver,
            classifier,
            config,
        }
    }

    /// Collect candidate URLs until `target` are found, the page stops
    /// growing, or the iteration ceiling is reached.
    ///
    /// Hitting the ceiling is a degraded completion, not an error: whatever
    /// was collected is returned.
    pub async fn collect(mut self, target: usize) -> Result<Vec<String>> {
        let mut pins = PinSet::new();
        let mut last_height = self.page_height().await?;

        for pass in 1..=self.config.max_scroll_passes {
            self.driver
                .execute_js(SCROLL_TO_BOTTOM)
                .await
                .context("scrolling page")?;
            tokio::time::sleep(Duration::from_millis(self.config.settle_ms)).await;

            self.extract_into(&mut pins).await;
            debug!("pass {pass}: {} candidates collected", pins.len());

            if pins.len() >= target {
                info!("collected {} candidates, target reached", pins.len());
                return Ok(pins.into_vec());
            }

            let height = self.page_height().await?;
            if height == last_height {
                info!(
                    "page height stable at {height}, stopping with {} candidates",
                    pins.len()
                );
                return Ok(pins.into_vec());
            }
            last_height = height;
        }

        info!(
            "scroll ceiling of {} passes reached with {} candidates",
            self.config.max_scroll_passes,
            pins.len()
        );
        Ok(pins.into_vec())
    }

    async fn page_height(&mut self) -> Result<i64> {
        let value = self
            .driver
            .execute_js(PAGE_HEIGHT)
            .await
            .context("reading page height")?;
        value
            .as_i64()
            .or_else(|| value.as_f64().map(|f| f as i64))
            .context("page height was not a number")
    }

    /// One extraction pass. Element-level read failures are transient
    /// (content reflows under us) and are logged and skipped.
    async fn extract_into(&mut self, pins: &mut PinSet) {
        let selector = format!("img[src*=\"{}\"]", self.config.image_host);
        let elements = match self.driver.find_elements(&selector).await {
            Ok(elements) => elements,
            Err(e) => {
                warn!("extraction pass failed: {e:#}");
                return;
            }
        };

        for element in elements {
            match element.attribute("src").await {
                Ok(Some(src)) => {
                    if let Some(url) = self.classifier.classify(&src) {
                        pins.insert(url);
                    }
                }
                Ok(None) => {}
                Err(e) => warn!("skipping unreadable element: {e:#}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::DomElement;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[test]
    fn test_pinset_deduplicates_preserving_order() {
        let mut pins = PinSet::new();
        assert!(pins.insert("a".to_string()));
        assert!(pins.insert("b".to_string()));
        assert!(!pins.insert("a".to_string()));
        assert!(pins.insert("c".to_string()));
        assert_eq!(pins.len(), 3);
        assert_eq!(pins.into_vec(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_pinset_grows_monotonically_across_passes() {
        let mut pins = PinSet::new();
        let passes = [vec!["a", "b"], vec![], vec!["a"], vec!["c", "b"]];
        let mut last = 0;
        for pass in passes {
            for url in pass {
                pins.insert(url.to_string());
            }
            assert!(pins.len() >= last);
            last = pins.len();
        }
        assert_eq!(last, 3);
    }

    struct FakeElement {
        src: Option<String>,
        readable: bool,
    }

    #[async_trait]
    impl DomElement for FakeElement {
        async fn attribute(&self, _name: &str) -> anyhow::Result<Option<String>> {
            if !self.readable {
                anyhow::bail!("element detached from document");
            }
            Ok(self.src.clone())
        }
    }

    /// Scripted page: each entry is one scroll pass's (height, image srcs).
    /// Passes beyond the script repeat the last entry.
    struct FakePage {
        passes: Vec<(i64, Vec<&'static str>)>,
        cursor: AtomicUsize,
        unreadable: Vec<&'static str>,
        scrolls: AtomicUsize,
        log: Mutex<Vec<String>>,
    }

    impl FakePage {
        fn new(passes: Vec<(i64, Vec<&'static str>)>) -> Self {
            Self {
                passes,
                cursor: AtomicUsize::new(0),
                unreadable: Vec::new(),
                scrolls: AtomicUsize::new(0),
                log: Mutex::new(Vec::new()),
            }
        }

        fn current(&self) -> &(i64, Vec<&'static str>) {
            let i = self.cursor.load(Ordering::SeqCst).min(self.passes.len() - 1);
            &self.passes[i]
        }
    }

    #[async_trait]
    impl BrowserDriver for FakePage {
        async fn navigate(&mut self, _url: &str, _timeout_ms: u64) -> anyhow::Result<()> {
            Ok(())
        }

        async fn execute_js(&self, script: &str) -> anyhow::Result<serde_json::Value> {
            if script == SCROLL_TO_BOTTOM {
                // Scrolling advances the page to its next scripted state.
                self.scrolls.fetch_add(1, Ordering::SeqCst);
                self.cursor.fetch_add(1, Ordering::SeqCst);
                Ok(serde_json::Value::Null)
            } else {
                Ok(serde_json::json!(self.current().0))
            }
        }

        async fn find_elements(
            &self,
            _selector: &str,
        ) -> anyhow::Result<Vec<Box<dyn DomElement>>> {
            self.log.lock().unwrap().push("extract".to_string());
            Ok(self
                .current()
                .1
                .iter()
                .map(|src| {
                    Box::new(FakeElement {
                        src: Some(src.to_string()),
                        readable: !self.unreadable.contains(src),
                    }) as Box<dyn DomElement>
                })
                .collect())
        }

        async fn fill(&self, _selector: &str, _text: &str) -> anyhow::Result<()> {
            Ok(())
        }

        async fn click(&self, _selector: &str) -> anyhow::Result<()> {
            Ok(())
        }

        async fn current_url(&self) -> anyhow::Result<String> {
            Ok("https://example.com/feed".to_string())
        }

        async fn quit(self: Box<Self>) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn config() -> ScraperConfig {
        ScraperConfig {
            image_host: "img.example".to_string(),
            settle_ms: 0,
            max_scroll_passes: 10,
            ..ScraperConfig::default()
        }
    }

    fn classifier() -> UrlClassifier {
        UrlClassifier::new("img.example")
    }

    #[tokio::test]
    async fn test_stops_when_target_reached() {
        // Initial height 100 (pass index 0), growing each scroll.
        let mut page = FakePage::new(vec![
            (100, vec![]),
            (200, vec!["https://img.example/564x/a.jpg"]),
            (
                300,
                vec![
                    "https://img.example/564x/a.jpg",
                    "https://img.example/564x/b.jpg",
                    "https://img.example/originals/c.jpg",
                ],
            ),
            (400, vec!["https://img.example/564x/d.jpg"]),
        ]);
        let cfg = config();
        let cls = classifier();

        let urls = ScrollCollector::new(&mut page, &cls, &cfg)
            .collect(3)
            .await
            .unwrap();

        assert_eq!(
            urls,
            vec![
                "https://img.example/originals/a.jpg",
                "https://img.example/originals/b.jpg",
                "https://img.example/originals/c.jpg",
            ]
        );
        // Target met on the second pass; the page never reached state 3.
        assert_eq!(page.scrolls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stops_when_height_converges() {
        // Height never changes after the first scroll.
        let mut page = FakePage::new(vec![
            (100, vec![]),
            (100, vec!["https://img.example/564x/a.jpg"]),
        ]);
        let cfg = config();
        let cls = classifier();

        let urls = ScrollCollector::new(&mut page, &cls, &cfg)
            .collect(50)
            .await
            .unwrap();

        assert_eq!(urls, vec!["https://img.example/originals/a.jpg"]);
        assert_eq!(page.scrolls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_iteration_ceiling_bounds_the_loop() {
        // Page keeps growing forever but never yields enough images.
        let passes: Vec<(i64, Vec<&'static str>)> = (0..100)
            .map(|i| (100 * (i + 1), vec!["https://img.example/564x/a.jpg"]))
            .collect();
        let mut page = FakePage::new(passes);
        let mut cfg = config();
        cfg.max_scroll_passes = 4;
        let cls = classifier();

        let urls = ScrollCollector::new(&mut page, &cls, &cfg)
            .collect(50)
            .await
            .unwrap();

        // Partial result, not an error.
        assert_eq!(urls.len(), 1);
        assert_eq!(page.scrolls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_same_url_across_passes_counted_once() {
        let mut page = FakePage::new(vec![
            (100, vec![]),
            (200, vec!["https://img.example/564x/a.jpg"]),
            (
                300,
                vec![
                    // Same image, surfaced once as a bucket URL and once
                    // already-normalized.
                    "https://img.example/564x/a.jpg",
                    "https://img.example/originals/a.jpg",
                    "https://img.example/564x/b.jpg",
                ],
            ),
            (300, vec![]),
        ]);
        let cfg = config();
        let cls = classifier();

        let urls = ScrollCollector::new(&mut page, &cls, &cfg)
            .collect(50)
            .await
            .unwrap();

        assert_eq!(
            urls,
            vec![
                "https://img.example/originals/a.jpg",
                "https://img.example/originals/b.jpg",
            ]
        );
    }

    #[tokio::test]
    async fn test_unreadable_element_does_not_abort_pass() {
        let mut page = FakePage::new(vec![
            (100, vec![]),
            (
                200,
                vec![
                    "https://img.example/564x/a.jpg",
                    "https://img.example/564x/gone.jpg",
                    "https://img.example/564x/b.jpg",
                ],
            ),
            (200, vec![]),
        ]);
        page.unreadable = vec!["https://img.example/564x/gone.jpg"];
        let cfg = config();
        let cls = classifier();

        let urls = ScrollCollector::new(&mut page, &cls, &cfg)
            .collect(50)
            .await
            .unwrap();

        assert_eq!(
            urls,
            vec![
                "https://img.example/originals/a.jpg",
                "https://img.example/originals/b.jpg",
            ]
        );
    }
}
