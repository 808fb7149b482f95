//! Reachability validation of candidate image URLs.
//!
//! Probes are HEAD requests issued in fixed-size concurrent batches with a
//! short pause between batches to avoid bursting the remote server. Every
//! probe failure — timeout, transport error, or an error status — resolves
//! that URL to not-reachable; nothing aborts the batch.

use crate::config::ScraperConfig;
use std::time::Duration;
use tracing::{debug, info};

/// Outcome of probing one URL.
#[derive(Debug, Clone)]
pub struct ReachabilityVerdict {
    pub url: String,
    pub reachable: bool,
}

/// Concurrency-bounded existence checker.
pub struct ReachabilityValidator {
    client: reqwest::Client,
    batch_size: usize,
    probe_timeout: Duration,
    batch_pause: Duration,
}

impl ReachabilityValidator {
    pub fn new(config: &ScraperConfig) -> Self {
        let ua = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                  AppleWebKit/537.36 (KHTML, like Gecko) \
                  Chrome/131.0.0.0 Safari/537.36";

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.probe_timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(ua)
            .build()
            .unwrap_or_default();

        Self {
            client,
            batch_size: config.probe_batch_size.max(1),
            probe_timeout: Duration::from_millis(config.probe_timeout_ms),
            batch_pause: Duration::from_millis(config.batch_pause_ms),
        }
    }

    /// Probe every URL, returning verdicts in input order.
    pub async fn validate(&self, urls: &[String]) -> Vec<ReachabilityVerdict> {
        info!("validating {} candidate URLs", urls.len());
        let mut verdicts = Vec::with_capacity(urls.len());

        let batches: Vec<&[String]> = urls.chunks(self.batch_size).collect();
        let batch_count = batches.len();

        for (i, batch) in batches.into_iter().enumerate() {
            // join_all preserves input order within the batch.
            let probes = batch.iter().map(|url| self.probe(url));
            let results = futures::future::join_all(probes).await;

            verdicts.extend(
                batch
                    .iter()
                    .zip(results)
                    .map(|(url, reachable)| ReachabilityVerdict {
                        url: url.clone(),
                        reachable,
                    }),
            );
            debug!("batch {}/{} probed", i + 1, batch_count);

            if i + 1 < batch_count {
                tokio::time::sleep(self.batch_pause).await;
            }
        }

        let reachable = verdicts.iter().filter(|v| v.reachable).count();
        info!("{reachable} of {} URLs reachable", urls.len());
        verdicts
    }

    async fn probe(&self, url: &str) -> bool {
        match self
            .client
            .head(url)
            .timeout(self.probe_timeout)
            .send()
            .await
        {
            Ok(response) => {
                let status = response.status().as_u16();
                (200..400).contains(&status)
            }
            Err(e) => {
                debug!("probe failed for {url}: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(batch_size: usize, timeout_ms: u64) -> ScraperConfig {
        ScraperConfig {
            probe_batch_size: batch_size,
            probe_timeout_ms: timeout_ms,
            batch_pause_ms: 0,
            ..ScraperConfig::default()
        }
    }

    #[tokio::test]
    async fn test_success_status_retained_error_status_dropped() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/originals/ok.jpg"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/originals/missing.jpg"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/originals/forbidden.jpg"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let urls = vec![
            format!("{}/originals/ok.jpg", server.uri()),
            format!("{}/originals/missing.jpg", server.uri()),
            format!("{}/originals/forbidden.jpg", server.uri()),
        ];
        let validator = ReachabilityValidator::new(&config(10, 2000));
        let verdicts = validator.validate(&urls).await;

        assert_eq!(verdicts.len(), 3);
        assert!(verdicts[0].reachable);
        assert!(!verdicts[1].reachable);
        assert!(!verdicts[2].reachable);
    }

    #[tokio::test]
    async fn test_timeout_resolves_to_not_reachable() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/originals/slow.jpg"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let urls = vec![format!("{}/originals/slow.jpg", server.uri())];
        let validator = ReachabilityValidator::new(&config(10, 100));
        let verdicts = validator.validate(&urls).await;

        assert_eq!(verdicts.len(), 1);
        assert!(!verdicts[0].reachable);
    }

    #[tokio::test]
    async fn test_transport_error_resolves_to_not_reachable() {
        // Nothing listens on this port.
        let urls = vec!["http://127.0.0.1:9/originals/dead.jpg".to_string()];
        let validator = ReachabilityValidator::new(&config(10, 500));
        let verdicts = validator.validate(&urls).await;

        assert!(!verdicts[0].reachable);
    }

    #[tokio::test]
    async fn test_verdicts_follow_input_order_across_batches() {
        let server = MockServer::start().await;
        for name in ["a", "b", "c", "d", "e"] {
            // Stagger delays so completion order differs from input order.
            let delay = if name == "a" { 200 } else { 10 };
            Mock::given(method("HEAD"))
                .and(path(format!("/originals/{name}.jpg")))
                .respond_with(
                    ResponseTemplate::new(200).set_delay(Duration::from_millis(delay)),
                )
                .mount(&server)
                .await;
        }

        let urls: Vec<String> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|n| format!("{}/originals/{n}.jpg", server.uri()))
            .collect();
        let validator = ReachabilityValidator::new(&config(2, 2000));
        let verdicts = validator.validate(&urls).await;

        let order: Vec<&str> = verdicts.iter().map(|v| v.url.as_str()).collect();
        assert_eq!(order, urls.iter().map(String::as_str).collect::<Vec<_>>());
        assert!(verdicts.iter().all(|v| v.reachable));
    }
}
