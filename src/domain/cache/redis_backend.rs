//! Redis-based template cache backend.
//!
//! Templates are stored as JSON strings with a Redis-side expiry (`SET EX`),
//! so every process sharing the Redis instance sees the same cache.
//! Prefix clears walk the keyspace with `SCAN MATCH` instead of flushing
//! the database.

use std::sync::Arc;

use async_trait::async_trait;

use crate::redis::{PoolError, RedisPool, RedisPoolExt};
use crate::template::Template;

use super::backend::{CacheBackendStats, CacheError, TemplateCache};

/// Redis-based template cache backend.
pub struct RedisTemplateCache {
    pool: Arc<RedisPool>,
}

impl RedisTemplateCache {
    pub fn new(pool: Arc<RedisPool>) -> Self {
        Self { pool }
    }

    fn map_error(err: PoolError) -> CacheError {
        match err {
            PoolError::Redis(e) => CacheError::Redis(e),
        }
    }
}

/// Escape glob metacharacters so a prefix matches literally in `SCAN MATCH`.
pub(crate) fn escape_glob(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl TemplateCache for RedisTemplateCache {
    fn backend_type(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<Template>, CacheError> {
        let raw = self.pool.get_string(key).await.map_err(Self::map_error)?;

        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, template: &Template, ttl_seconds: u64) -> Result<(), CacheError> {
        if ttl_seconds == 0 {
            self.pool
                .del_keys(&[key.to_string()])
                .await
                .map_err(Self::map_error)?;
            return Ok(());
        }

        let json = serde_json::to_string(template)?;
        self.pool
            .set_ex(key, &json, ttl_seconds)
            .await
            .map_err(Self::map_error)?;

        tracing::debug!(cache_key = %key, ttl_seconds = ttl_seconds, "Template cached in Redis");

        Ok(())
    }

    async fn forget(&self, key: &str) -> Result<(), CacheError> {
        self.pool
            .del_keys(&[key.to_string()])
            .await
            .map_err(Self::map_error)?;
        Ok(())
    }

    async fn clear_prefix(&self, prefix: &str) -> Result<usize, CacheError> {
        let pattern = format!("{}*", escape_glob(prefix));
        let keys = self.pool.scan_match(&pattern).await.map_err(Self::map_error)?;

        let removed = self.pool.del_keys(&keys).await.map_err(Self::map_error)?;

        tracing::info!(
            prefix = %prefix,
            matched = keys.len(),
            removed = removed,
            "Cleared template cache entries from Redis"
        );

        Ok(removed)
    }

    async fn stats(&self) -> CacheBackendStats {
        let healthy = match self.pool.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Redis template cache health probe failed");
                false
            }
        };

        CacheBackendStats {
            backend_type: self.backend_type().to_string(),
            entries: None,
            healthy,
        }
    }
}
