//! Redis connection pool for the shared template cache.
//!
//! Holds one multiplexed connection, re-established on demand after the
//! connection drops.

use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, RedisError, RedisResult};
use tokio::sync::RwLock;

use crate::config::RedisConfig;

/// Error type for Redis pool operations.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// Redis operation failed
    #[error("Redis error: {0}")]
    Redis(#[from] RedisError),
}

/// Redis connection pool for cache operations.
///
/// The multiplexed connection is cloned per command, so a single pool
/// serves every request task.
pub struct RedisPool {
    /// Redis client for creating connections
    client: Client,

    /// Multiplexed connection (shared across tasks)
    connection: RwLock<Option<MultiplexedConnection>>,

    /// Configuration
    config: RedisConfig,
}

impl RedisPool {
    /// Create a new Redis pool. No connection is made until first use.
    pub fn new(config: RedisConfig) -> Result<Self, PoolError> {
        let client = Client::open(config.url.as_str())?;

        Ok(Self {
            client,
            connection: RwLock::new(None),
            config,
        })
    }

    /// Get a connection from the pool.
    ///
    /// This will establish a new connection if none exists.
    pub async fn get_connection(&self) -> Result<MultiplexedConnection, PoolError> {
        {
            let conn = self.connection.read().await;
            if let Some(ref c) = *conn {
                return Ok(c.clone());
            }
        }

        self.connect().await
    }

    async fn connect(&self) -> Result<MultiplexedConnection, PoolError> {
        let mut conn_guard = self.connection.write().await;

        // Double-check in case another task connected while we waited
        if let Some(ref c) = *conn_guard {
            return Ok(c.clone());
        }

        match self.client.get_multiplexed_tokio_connection().await {
            Ok(conn) => {
                *conn_guard = Some(conn.clone());
                tracing::info!("Redis pool connection established");
                Ok(conn)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to connect to Redis");
                Err(PoolError::Redis(e))
            }
        }
    }

    /// Execute a Redis command on a pooled connection.
    ///
    /// Connection-level failures reset the pooled connection so the next
    /// call reconnects.
    pub async fn execute<F, T, Fut>(&self, f: F) -> Result<T, PoolError>
    where
        F: FnOnce(MultiplexedConnection) -> Fut,
        Fut: std::future::Future<Output = RedisResult<T>>,
    {
        let conn = self.get_connection().await?;

        match f(conn).await {
            Ok(result) => Ok(result),
            Err(e) => {
                if e.is_connection_dropped() || e.is_io_error() {
                    let mut conn_guard = self.connection.write().await;
                    *conn_guard = None;
                }
                Err(PoolError::Redis(e))
            }
        }
    }

    /// Get the Redis URL (for debugging).
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Ping Redis to check connectivity.
    pub async fn ping(&self) -> Result<(), PoolError> {
        self.execute(|mut conn| async move {
            let pong: RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
            pong.map(|_| ())
        })
        .await
    }
}

/// Typed helpers for the Redis commands the cache backend issues.
#[async_trait::async_trait]
pub trait RedisPoolExt {
    /// Get a string value.
    async fn get_string(&self, key: &str) -> Result<Option<String>, PoolError>;

    /// Set a string value with an expiry in seconds.
    async fn set_ex(&self, key: &str, value: &str, seconds: u64) -> Result<(), PoolError>;

    /// Delete keys, returning how many existed.
    async fn del_keys(&self, keys: &[String]) -> Result<usize, PoolError>;

    /// Collect every key matching a glob pattern using `SCAN`.
    async fn scan_match(&self, pattern: &str) -> Result<Vec<String>, PoolError>;
}

#[async_trait::async_trait]
impl RedisPoolExt for RedisPool {
    async fn get_string(&self, key: &str) -> Result<Option<String>, PoolError> {
        self.execute(|mut conn| async move { conn.get(key).await })
            .await
    }

    async fn set_ex(&self, key: &str, value: &str, seconds: u64) -> Result<(), PoolError> {
        self.execute(|mut conn| async move { conn.set_ex::<_, _, ()>(key, value, seconds).await })
            .await
    }

    async fn del_keys(&self, keys: &[String]) -> Result<usize, PoolError> {
        if keys.is_empty() {
            return Ok(0);
        }

        let keys = keys.to_vec();
        self.execute(|mut conn| async move { conn.del(keys).await })
            .await
    }

    async fn scan_match(&self, pattern: &str) -> Result<Vec<String>, PoolError> {
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;

        loop {
            let (next, batch): (u64, Vec<String>) = self
                .execute(|mut conn| async move {
                    redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(pattern)
                        .arg("COUNT")
                        .arg(100)
                        .query_async(&mut conn)
                        .await
                })
                .await?;

            keys.extend(batch);

            if next == 0 {
                break;
            }
            cursor = next;
        }

        // SCAN may return a key more than once
        keys.sort();
        keys.dedup();

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> RedisConfig {
        RedisConfig {
            url: "redis://localhost:6379".to_string(),
        }
    }

    #[test]
    fn test_pool_creation() {
        let pool = RedisPool::new(create_test_config()).unwrap();
        assert_eq!(pool.url(), "redis://localhost:6379");
    }

    #[test]
    fn test_pool_rejects_invalid_url() {
        let config = RedisConfig {
            url: "not-a-redis-url".to_string(),
        };
        assert!(matches!(RedisPool::new(config), Err(PoolError::Redis(_))));
    }
}
