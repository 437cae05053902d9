//! Prometheus metrics for the template service.
//!
//! - Fetch metrics (outcomes, API latency)
//! - Cache metrics (write failures, cleared entries)
//! - Mail metrics (messages composed, sent, failed)

mod helpers;

pub use helpers::{encode_metrics, CacheMetrics, FetchMetrics, MailMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Histogram, IntCounter, IntCounterVec, IntGauge,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "topol";

lazy_static! {
    // ============================================================================
    // Fetch Metrics
    // ============================================================================

    /// Template fetches by outcome (hit, fetched, not_found, api_error)
    pub static ref TEMPLATE_FETCH_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_template_fetch_total", METRIC_PREFIX),
        "Total template fetches by outcome",
        &["outcome"]
    ).unwrap();

    /// Latency of requests to the template API (cache hits excluded)
    pub static ref TEMPLATE_FETCH_DURATION: Histogram = register_histogram!(
        format!("{}_template_fetch_duration_seconds", METRIC_PREFIX),
        "Template API request latency in seconds",
        vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    ).unwrap();

    // ============================================================================
    // Cache Metrics
    // ============================================================================

    /// Cache backend failures by operation (get, put, forget, clear)
    pub static ref TEMPLATE_CACHE_ERRORS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_template_cache_errors_total", METRIC_PREFIX),
        "Total template cache backend errors",
        &["operation"]
    ).unwrap();

    /// Entries removed by cache clears
    pub static ref TEMPLATE_CACHE_CLEARED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_template_cache_cleared_total", METRIC_PREFIX),
        "Total template cache entries removed by clear operations"
    ).unwrap();

    /// Live cache entries (memory backend only, refreshed on scrape)
    pub static ref TEMPLATE_CACHE_ENTRIES: IntGauge = register_int_gauge!(
        format!("{}_template_cache_entries", METRIC_PREFIX),
        "Current number of cached templates"
    ).unwrap();

    /// Cache backend health (0=unhealthy, 1=healthy)
    pub static ref TEMPLATE_CACHE_HEALTHY: IntGauge = register_int_gauge!(
        format!("{}_template_cache_healthy", METRIC_PREFIX),
        "Template cache backend health status"
    ).unwrap();

    // ============================================================================
    // Mail Metrics
    // ============================================================================

    /// Messages rendered from templates
    pub static ref MESSAGES_COMPOSED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_messages_composed_total", METRIC_PREFIX),
        "Total messages rendered from templates"
    ).unwrap();

    /// Messages handed to the mail sender successfully
    pub static ref MAIL_SENT_TOTAL: IntCounter = register_int_counter!(
        format!("{}_mail_sent_total", METRIC_PREFIX),
        "Total messages accepted by the mail sender"
    ).unwrap();

    /// Messages the mail sender rejected
    pub static ref MAIL_FAILED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_mail_failed_total", METRIC_PREFIX),
        "Total messages rejected by the mail sender"
    ).unwrap();
}
