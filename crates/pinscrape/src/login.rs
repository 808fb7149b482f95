//! Authenticated-navigation flow run before crawling when credentials are
//! configured.
//!
//! Navigate to the login page, wait for the form, submit the credential
//! pair, then wait for the post-login navigation. Every wait is bounded;
//! exceeding a bound fails the whole flow.

use crate::config::{Credentials, ScraperConfig};
use crate::driver::BrowserDriver;
use anyhow::{bail, Context, Result};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

const EMAIL_SELECTOR: &str = "#email";
const PASSWORD_SELECTOR: &str = "#password";
const SUBMIT_SELECTOR: &str = "button[type='submit']";
const LOGIN_PATH: &str = "/login";

/// Interval between polls while waiting on a login-flow condition.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Drive the login flow to completion.
pub(crate) async fn run(
    driver: &mut dyn BrowserDriver,
    config: &ScraperConfig,
    credentials: &Credentials,
) -> Result<()> {
    let login_url = format!("{}{}", config.base_url.trim_end_matches('/'), LOGIN_PATH);
    info!("logging in via {login_url}");

    driver
        .navigate(&login_url, config.nav_timeout_ms)
        .await
        .context("opening login page")?;

    wait_for_element(driver, EMAIL_SELECTOR, config.login_wait_ms)
        .await
        .context("locating login form")?;

    driver
        .fill(EMAIL_SELECTOR, &credentials.email)
        .await
        .context("entering email")?;
    driver
        .fill(PASSWORD_SELECTOR, &credentials.password)
        .await
        .context("entering password")?;
    driver
        .click(SUBMIT_SELECTOR)
        .await
        .context("submitting login form")?;

    wait_for_departure(driver, LOGIN_PATH, config.login_wait_ms)
        .await
        .context("awaiting post-login navigation")?;

    info!("login completed");
    Ok(())
}

/// Poll until `selector` matches at least one element, or the bound elapses.
async fn wait_for_element(
    driver: &dyn BrowserDriver,
    selector: &str,
    bound_ms: u64,
) -> Result<()> {
    let deadline = Instant::now() + Duration::from_millis(bound_ms);
    loop {
        match driver.find_elements(selector).await {
            Ok(elements) if !elements.is_empty() => return Ok(()),
            Ok(_) => debug!("waiting for {selector}"),
            Err(e) => debug!("element poll failed: {e:#}"),
        }
        if Instant::now() >= deadline {
            bail!("control {selector} did not appear within {bound_ms}ms");
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

/// Poll until the current URL no longer contains `path`, or the bound
/// elapses. A changed URL is the success signal for a submitted login.
async fn wait_for_departure(driver: &dyn BrowserDriver, path: &str, bound_ms: u64) -> Result<()> {
    let deadline = Instant::now() + Duration::from_millis(bound_ms);
    loop {
        let url = driver.current_url().await.context("reading current URL")?;
        if !url.contains(path) {
            return Ok(());
        }
        if Instant::now() >= deadline {
            bail!("still on {path} after {bound_ms}ms");
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
