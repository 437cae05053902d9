//! Health check endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub cache: CacheHealthResponse,
}

#[derive(Debug, Serialize)]
pub struct CacheHealthResponse {
    pub backend: String,
    pub enabled: bool,
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<usize>,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache_stats = state.cache.stats().await;
    let uptime_seconds = state.start_time.elapsed().as_secs();

    // A broken cache only costs latency, so the service stays up
    let status = if cache_stats.healthy { "healthy" } else { "degraded" };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
        cache: CacheHealthResponse {
            backend: cache_stats.backend_type,
            enabled: state.fetcher.is_cache_enabled(),
            healthy: cache_stats.healthy,
            entries: cache_stats.entries,
        },
    })
}
