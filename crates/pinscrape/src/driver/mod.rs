//! Browser driver abstraction.
//!
//! Defines the capability traits that abstract over the automation engine
//! (currently Chromium via chromiumoxide). A deterministic fake
//! implementation can drive the collector and login flow in unit tests
//! without a real browser.

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;

/// A handle to a DOM element found by a selector query.
#[async_trait]
pub trait DomElement: Send + Sync {
    /// Read an attribute value. `Ok(None)` when the attribute is absent;
    /// `Err` when the element can no longer be read (e.g. removed from the
    /// DOM between query and read).
    async fn attribute(&self, name: &str) -> Result<Option<String>>;
}

/// A live page session capable of navigation, script execution, and DOM
/// inspection.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Navigate to a URL, failing after `timeout_ms`.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<()>;
    /// Execute JavaScript in page context and return its value.
    async fn execute_js(&self, script: &str) -> Result<serde_json::Value>;
    /// Query DOM elements by CSS selector.
    async fn find_elements(&self, selector: &str) -> Result<Vec<Box<dyn DomElement>>>;
    /// Focus the element matching `selector` and type `text` into it.
    async fn fill(&self, selector: &str, text: &str) -> Result<()>;
    /// Click the element matching `selector`.
    async fn click(&self, selector: &str) -> Result<()>;
    /// The page's current URL.
    async fn current_url(&self) -> Result<String>;
    /// Release the underlying automation process.
    async fn quit(self: Box<Self>) -> Result<()>;
}

/// Launches browser drivers.
///
/// [`crate::BrowserSession`] goes through this seam so tests can inject a
/// fake driver factory.
#[async_trait]
pub trait DriverLauncher: Send + Sync {
    /// Start a fresh driver instance.
    async fn launch(&self) -> Result<Box<dyn BrowserDriver>>;
}
