//! Template cache backend factory

use std::sync::Arc;

use crate::config::CacheConfig;
use crate::redis::RedisPool;

use super::backend::TemplateCache;
use super::memory_backend::MemoryTemplateCache;
use super::redis_backend::RedisTemplateCache;

/// Create a template cache backend based on configuration.
///
/// - `"redis"`: a `RedisTemplateCache` if a Redis pool is provided
/// - `"memory"` (default): a `MemoryTemplateCache`
///
/// A Redis request without a pool falls back to memory with a warning.
pub fn create_template_cache(
    settings: &CacheConfig,
    redis_pool: Option<Arc<RedisPool>>,
) -> Arc<dyn TemplateCache> {
    match settings.backend.as_str() {
        "redis" => {
            if let Some(pool) = redis_pool {
                tracing::info!(
                    backend = "redis",
                    prefix = %settings.key_prefix,
                    url = %pool.url(),
                    "Creating Redis template cache"
                );
                Arc::new(RedisTemplateCache::new(pool))
            } else {
                tracing::warn!(
                    "Redis template cache requested but no pool provided, falling back to memory"
                );
                Arc::new(MemoryTemplateCache::new())
            }
        }
        _ => {
            tracing::info!(backend = "memory", "Creating memory template cache");
            Arc::new(MemoryTemplateCache::new())
        }
    }
}
