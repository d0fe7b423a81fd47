//! HTTP server for proxy endpoints
//!
//! Provides /health, /image, /report and the /purge, /restore, /save
//! lifecycle endpoints.

use crate::error::Result;
use crate::types::{
    sniff_content_type, HealthResponse, ImageQuery, ReportResponse, SummaryResponse,
};
use axum::{
    extract::{Query, State},
    http::{header, HeaderName},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use image_cache::{HttpFetcher, ImageCache};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

static X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Shared state for the HTTP server
pub struct ServerState {
    pub cache: ImageCache<HttpFetcher>,
    pub started_at: DateTime<Utc>,
}

impl ServerState {
    pub fn new(cache: ImageCache<HttpFetcher>) -> Self {
        Self {
            cache,
            started_at: Utc::now(),
        }
    }
}

pub type SharedState = Arc<ServerState>;

/// Create the HTTP router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/image", get(get_image))
        .route("/report", get(report))
        .route("/purge", post(purge))
        .route("/restore", post(restore))
        .route("/save", post(save))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(state: SharedState, port: u16) -> std::io::Result<()> {
    let router = create_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await
}

/// Health check endpoint
async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let uptime_secs = (Utc::now() - state.started_at).num_seconds().max(0) as u64;

    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs,
        cache: state.cache.stats().await,
    })
}

/// Serve the bytes for `?url=`, fetching them on first request
async fn get_image(
    State(state): State<SharedState>,
    Query(query): Query<ImageQuery>,
) -> Result<Response> {
    let url = query.url.unwrap_or_default();
    let resolved = state.cache.resolve_with_status(&url).await?;
    let cache_header = if resolved.from_cache { "HIT" } else { "MISS" };

    Ok((
        [
            (header::CONTENT_TYPE, sniff_content_type(&resolved.data)),
            (header::CACHE_CONTROL, "public, max-age=86400"),
            (X_CACHE.clone(), cache_header),
        ],
        resolved.data,
    )
        .into_response())
}

async fn report(State(state): State<SharedState>) -> Result<Json<ReportResponse>> {
    let report = state.cache.report().await?;
    Ok(Json(ReportResponse {
        items: report.items,
        total_size: report.total_size,
        summary: report.to_string(),
    }))
}

async fn purge(State(state): State<SharedState>) -> Result<Json<SummaryResponse>> {
    let outcome = state.cache.purge().await?;
    Ok(Json(SummaryResponse {
        summary: outcome.to_string(),
    }))
}

async fn restore(State(state): State<SharedState>) -> Result<Json<SummaryResponse>> {
    let summary = state.cache.restore().await?;
    Ok(Json(SummaryResponse {
        summary: summary.to_string(),
    }))
}

async fn save(State(state): State<SharedState>) -> Result<Json<SummaryResponse>> {
    let summary = state.cache.save().await?;
    Ok(Json(SummaryResponse {
        summary: summary.to_string(),
    }))
}
