//! Metrics helper functions

use prometheus::{Encoder, TextEncoder};

use super::{
    MAIL_FAILED_TOTAL, MAIL_SENT_TOTAL, MESSAGES_COMPOSED_TOTAL, TEMPLATE_CACHE_CLEARED_TOTAL,
    TEMPLATE_CACHE_ERRORS_TOTAL, TEMPLATE_FETCH_DURATION, TEMPLATE_FETCH_TOTAL,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording template fetch metrics
pub struct FetchMetrics;

impl FetchMetrics {
    /// Record a fetch answered from the cache
    pub fn record_cache_hit() {
        TEMPLATE_FETCH_TOTAL.with_label_values(&["hit"]).inc();
    }

    /// Record a successful API fetch and its latency
    pub fn record_fetched(duration_secs: f64) {
        TEMPLATE_FETCH_TOTAL.with_label_values(&["fetched"]).inc();
        TEMPLATE_FETCH_DURATION.observe(duration_secs);
    }

    /// Record a 404 from the API
    pub fn record_not_found(duration_secs: f64) {
        TEMPLATE_FETCH_TOTAL.with_label_values(&["not_found"]).inc();
        TEMPLATE_FETCH_DURATION.observe(duration_secs);
    }

    /// Record any other API failure
    pub fn record_api_error(duration_secs: f64) {
        TEMPLATE_FETCH_TOTAL.with_label_values(&["api_error"]).inc();
        TEMPLATE_FETCH_DURATION.observe(duration_secs);
    }
}

/// Helper struct for recording cache metrics
pub struct CacheMetrics;

impl CacheMetrics {
    /// Record a cache backend failure for an operation
    pub fn record_error(operation: &str) {
        TEMPLATE_CACHE_ERRORS_TOTAL
            .with_label_values(&[operation])
            .inc();
    }

    /// Record entries removed by a clear
    pub fn record_cleared(count: usize) {
        TEMPLATE_CACHE_CLEARED_TOTAL.inc_by(count as u64);
    }
}

/// Helper struct for recording mail metrics
pub struct MailMetrics;

impl MailMetrics {
    pub fn record_composed() {
        MESSAGES_COMPOSED_TOTAL.inc();
    }

    pub fn record_sent() {
        MAIL_SENT_TOTAL.inc();
    }

    pub fn record_failed() {
        MAIL_FAILED_TOTAL.inc();
    }
}
