//! Backend trait for template cache storage.
//!
//! This module defines the abstraction over the key/value store that holds
//! fetched templates, allowing the in-process store and Redis to be used
//! interchangeably. Expiry is the store's responsibility.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::template::Template;

/// Errors that can occur during cache backend operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Redis operation failed
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend is temporarily unavailable
    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

/// Statistics about the cache backend.
#[derive(Debug, Clone, Serialize)]
pub struct CacheBackendStats {
    /// Backend type identifier
    pub backend_type: String,

    /// Number of live entries, when the backend can tell cheaply
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<usize>,

    /// Whether the backend answered its last health probe
    pub healthy: bool,
}

/// Key/value store for fetched templates.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; they are shared across request
/// tasks and perform their own synchronisation.
#[async_trait]
pub trait TemplateCache: Send + Sync {
    /// Backend identifier (`memory`, `redis`)
    fn backend_type(&self) -> &'static str;

    /// Look up a live entry.
    async fn get(&self, key: &str) -> Result<Option<Template>, CacheError>;

    /// Store an entry for `ttl_seconds`, replacing any previous value.
    ///
    /// A TTL of zero stores nothing and drops any existing entry.
    async fn put(&self, key: &str, template: &Template, ttl_seconds: u64) -> Result<(), CacheError>;

    /// Remove one entry. Missing keys are not an error.
    async fn forget(&self, key: &str) -> Result<(), CacheError>;

    /// Remove every entry whose key starts with `prefix`.
    ///
    /// # Returns
    ///
    /// The number of entries removed.
    async fn clear_prefix(&self, prefix: &str) -> Result<usize, CacheError>;

    /// Drop expired entries the store does not evict by itself.
    ///
    /// # Returns
    ///
    /// The number of entries removed.
    async fn cleanup_expired(&self) -> usize {
        0
    }

    /// Get cache statistics.
    async fn stats(&self) -> CacheBackendStats;
}
