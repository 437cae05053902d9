//! Template cache storage.
//!
//! Fetched templates are cached under `prefix + template_id` with a TTL.
//! Two backends are available:
//! - `memory`: per-process `DashMap`, entries expire lazily
//! - `redis`: shared across processes, expiry enforced by Redis

mod backend;
mod factory;
mod memory_backend;
mod redis_backend;

pub use backend::{CacheBackendStats, CacheError, TemplateCache};
pub use factory::create_template_cache;
pub use memory_backend::MemoryTemplateCache;
pub use redis_backend::RedisTemplateCache;
