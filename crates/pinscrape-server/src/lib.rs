//! Pinscrape server library — REST API and response envelope over the
//! core crawler.

pub mod response;
pub mod rest;

pub use response::{ApiError, ApiResponse};
pub use rest::{router, serve, AppState};
