//! Browser session lifecycle.
//!
//! One session owns at most one live driver. The driver is launched lazily
//! on first lease and reused across crawls until the session is closed or a
//! setup step fails. The driver slot sits behind an async mutex: concurrent
//! lease calls during initialization await the same in-flight setup, and a
//! held lease serializes crawls against the session.

use crate::config::ScraperConfig;
use crate::driver::{BrowserDriver, DriverLauncher};
use crate::error::{ScrapeError, ScraperResult};
use crate::login;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

/// Exclusive handle over one browser session.
pub struct BrowserSession {
    launcher: Arc<dyn DriverLauncher>,
    config: Arc<ScraperConfig>,
    driver: Mutex<Option<Box<dyn BrowserDriver>>>,
}

/// Exclusive lease on the session's driver for the duration of one crawl.
///
/// Dropping the lease releases the session for the next crawl without
/// shutting the driver down.
pub struct SessionLease<'a> {
    guard: MutexGuard<'a, Option<Box<dyn BrowserDriver>>>,
}

impl std::fmt::Debug for SessionLease<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionLease").finish_non_exhaustive()
    }
}

impl SessionLease<'_> {
    /// The leased driver.
    pub fn driver(&mut self) -> &mut dyn BrowserDriver {
        self.guard
            .as_deref_mut()
            .expect("a lease always holds a driver")
    }
}

impl BrowserSession {
    pub fn new(launcher: Arc<dyn DriverLauncher>, config: Arc<ScraperConfig>) -> Self {
        Self {
            launcher,
            config,
            driver: Mutex::new(None),
        }
    }

    /// Lease the session's driver, launching (and logging in) on first use.
    ///
    /// On a launch failure the slot stays empty so a later call may retry.
    /// On a login failure the driver is quit before the error surfaces, so
    /// no partial-login state is observable.
    pub async fn lease(&self) -> ScraperResult<SessionLease<'_>> {
        let mut guard = self.driver.lock().await;

        if guard.is_none() {
            info!("launching browser driver");
            let mut driver = self
                .launcher
                .launch()
                .await
                .map_err(|e| ScrapeError::Initialization(format!("{e:#}")))?;

            if let Some(credentials) = &self.config.credentials {
                if let Err(e) = login::run(driver.as_mut(), &self.config, credentials).await {
                    if let Err(quit_err) = driver.quit().await {
                        warn!("driver teardown after failed login: {quit_err:#}");
                    }
                    return Err(ScrapeError::Authentication(format!("{e:#}")));
                }
            }

            *guard = Some(driver);
        }

        Ok(SessionLease { guard })
    }

    /// Whether a driver is currently live.
    pub async fn is_active(&self) -> bool {
        self.driver.lock().await.is_some()
    }

    /// Release the driver unconditionally. Idempotent; safe on an
    /// already-closed session.
    pub async fn close(&self) {
        if let Some(driver) = self.driver.lock().await.take() {
            info!("closing browser session");
            if let Err(e) = driver.quit().await {
                warn!("driver teardown: {e:#}");
            }
        }
    }
}
