use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::server::AppState;

use super::cache::{clear_all_templates, clear_template};
use super::health::health;
use super::metrics::prometheus_metrics;
use super::template::{get_template, render_template, send_template};

/// Unauthenticated operational endpoints
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
}

/// Template endpoints, mounted under `/api/v1`
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Templates
        .route("/templates/{id}", get(get_template))
        .route("/templates/{id}/render", post(render_template))
        .route("/templates/{id}/send", post(send_template))
        // Cache administration
        .route("/cache/templates", delete(clear_all_templates))
        .route("/cache/templates/{id}", delete(clear_template))
}
