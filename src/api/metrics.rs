//! Prometheus metrics endpoint.

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::metrics;
use crate::server::AppState;

/// GET /metrics - Prometheus metrics endpoint
pub async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    update_metrics_from_state(&state).await;

    match metrics::encode_metrics() {
        Ok(output) => (
            StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            output,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode Prometheus metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(axum::http::header::CONTENT_TYPE, "text/plain")],
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}

/// Refresh scrape-time gauges from the cache backend
async fn update_metrics_from_state(state: &AppState) {
    let cache_stats = state.cache.stats().await;

    metrics::TEMPLATE_CACHE_HEALTHY.set(if cache_stats.healthy { 1 } else { 0 });
    if let Some(entries) = cache_stats.entries {
        metrics::TEMPLATE_CACHE_ENTRIES.set(i64::try_from(entries).unwrap_or(i64::MAX));
    }
}
