//! In-memory template cache backend using DashMap.
//!
//! Entries live in process memory and are lost on restart. Expired entries
//! are dropped lazily on read and by `cleanup_expired`.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::template::Template;

use super::backend::{CacheBackendStats, CacheError, TemplateCache};

/// A cached template with its expiry.
#[derive(Debug, Clone)]
struct CachedTemplate {
    template: Template,
    expires_at: DateTime<Utc>,
}

impl CachedTemplate {
    fn new(template: Template, ttl_seconds: u64) -> Self {
        let expires_at = i64::try_from(ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            template,
            expires_at,
        }
    }

    fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// In-memory template cache backend.
pub struct MemoryTemplateCache {
    entries: DashMap<String, CachedTemplate>,
}

impl Default for MemoryTemplateCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTemplateCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Number of stored entries, expired ones included until cleaned up.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Store an entry that is already past its expiry.
    #[cfg(test)]
    pub(crate) fn insert_expired(&self, key: &str, template: &Template) {
        self.entries.insert(
            key.to_string(),
            CachedTemplate {
                template: template.clone(),
                expires_at: Utc::now() - Duration::seconds(1),
            },
        );
    }
}

#[async_trait]
impl TemplateCache for MemoryTemplateCache {
    fn backend_type(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<Template>, CacheError> {
        let Some(entry) = self.entries.get(key) else {
            return Ok(None);
        };

        if !entry.is_expired() {
            return Ok(Some(entry.template.clone()));
        }

        // Release the read guard before removing
        drop(entry);
        self.entries.remove_if(key, |_, entry| entry.is_expired());
        tracing::debug!(cache_key = %key, "Dropped expired template cache entry");

        Ok(None)
    }

    async fn put(&self, key: &str, template: &Template, ttl_seconds: u64) -> Result<(), CacheError> {
        if ttl_seconds == 0 {
            self.entries.remove(key);
            return Ok(());
        }

        self.entries
            .insert(key.to_string(), CachedTemplate::new(template.clone(), ttl_seconds));

        Ok(())
    }

    async fn forget(&self, key: &str) -> Result<(), CacheError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn clear_prefix(&self, prefix: &str) -> Result<usize, CacheError> {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        Ok(before.saturating_sub(self.entries.len()))
    }

    async fn cleanup_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        let removed = before.saturating_sub(self.entries.len());

        if removed > 0 {
            tracing::debug!(removed = removed, "Removed expired template cache entries");
        }

        removed
    }

    async fn stats(&self) -> CacheBackendStats {
        CacheBackendStats {
            backend_type: self.backend_type().to_string(),
            entries: Some(self.entries.len()),
            healthy: true,
        }
    }
}
