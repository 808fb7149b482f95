//! Pinscrape — scroll-crawling image harvester for Pinterest-style
//! discovery feeds.
//!
//! Drives a headless browser through repeated scroll-triggered page growth,
//! deduplicates and normalizes discovered image URLs to their largest
//! variant, and validates that each is actually retrievable before
//! returning it.

pub mod cache;
pub mod classify;
pub mod collect;
pub mod config;
pub mod driver;
pub mod error;
mod login;
pub mod scrape;
pub mod session;
pub mod validate;

pub use cache::ResultCache;
pub use classify::UrlClassifier;
pub use collect::{PinSet, ScrollCollector};
pub use config::{Credentials, ScraperConfig};
pub use driver::{BrowserDriver, DomElement, DriverLauncher};
pub use error::{ScrapeError, ScraperResult};
pub use scrape::{ScrapeRequest, ScrapeResult, Scraper};
pub use session::BrowserSession;
pub use validate::{ReachabilityValidator, ReachabilityVerdict};
