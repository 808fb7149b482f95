//! HTTP REST API over the scraper.
//!
//! Thin layer: validate the request shape, dispatch to [`Scraper::scrape`],
//! wrap the outcome in the JSON envelope. Scrapes against the one shared
//! session queue up behind its lease.

use crate::response::ApiResponse;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use pinscrape::{ScrapeRequest, ScrapeResult, Scraper};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Shared state behind every handler.
pub struct AppState {
    pub scraper: Arc<Scraper>,
}

/// Build the axum router with all REST endpoints.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/scrape", post(scrape_post))
        .route("/api/scrape/:category", get(scrape_get))
        .layer(cors)
        .with_state(state)
}

/// Serve the REST API on `port` until the process is stopped.
pub async fn serve(port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(state);
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));
    info!("REST API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Debug, Deserialize)]
struct ScrapeBody {
    category: Option<String>,
    limit: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
struct ScrapeParams {
    limit: Option<usize>,
}

async fn health() -> Json<Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn scrape_post(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ScrapeBody>,
) -> (StatusCode, Json<ApiResponse<ScrapeResult>>) {
    let category = match body.category.as_deref().map(str::trim) {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(
                    "INVALID_CATEGORY",
                    "The provided category is invalid or empty",
                    Some("Category must be a non-empty string".to_string()),
                )),
            )
        }
    };
    run_scrape(&state, Some(category), body.limit).await
}

async fn scrape_get(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
    Query(params): Query<ScrapeParams>,
) -> (StatusCode, Json<ApiResponse<ScrapeResult>>) {
    let category = category.trim().to_string();
    if category.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(
                "INVALID_CATEGORY",
                "The provided category is invalid or empty",
                None,
            )),
        );
    }
    run_scrape(&state, Some(category), params.limit).await
}

async fn run_scrape(
    state: &AppState,
    category: Option<String>,
    limit: Option<usize>,
) -> (StatusCode, Json<ApiResponse<ScrapeResult>>) {
    let config = state.scraper.config();
    let limit = limit.unwrap_or(config.default_limit);
    if limit > config.max_images {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(
                "LIMIT_EXCEEDED",
                &format!(
                    "Requested image limit exceeds maximum allowed ({})",
                    config.max_images
                ),
                Some(format!("Please request {} or fewer images", config.max_images)),
            )),
        );
    }

    info!("scrape request: category={category:?}, limit={limit}");
    let request = ScrapeRequest { category, limit };

    match state.scraper.scrape(&request).await {
        Ok(result) => {
            info!(
                "scrape completed: {} images in {:.1}s",
                result.total_images, result.elapsed_seconds
            );
            (StatusCode::OK, Json(ApiResponse::ok(result)))
        }
        Err(e) => {
            error!("scrape failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(
                    "SCRAPING_FAILED",
                    "Scraping operation failed",
                    Some(e.to_string()),
                )),
            )
        }
    }
}
