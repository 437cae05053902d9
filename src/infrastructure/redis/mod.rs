//! Redis connectivity
//!
//! - `pool`: connection pool used by the Redis template cache backend

pub mod pool;

pub use pool::{PoolError, RedisPool, RedisPoolExt};
