use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::cache::TemplateCache;

/// Background task that sweeps expired template cache entries
pub struct CacheCleanupTask {
    cache: Arc<dyn TemplateCache>,
    interval: Duration,
    shutdown: broadcast::Receiver<()>,
}

impl CacheCleanupTask {
    pub fn new(
        cache: Arc<dyn TemplateCache>,
        interval_seconds: u64,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            cache,
            interval: Duration::from_secs(interval_seconds.max(1)),
            shutdown,
        }
    }

    /// Run until a shutdown signal arrives
    pub async fn run(mut self) {
        let mut cleanup_timer = tokio::time::interval(self.interval);

        // Skip immediate first tick
        cleanup_timer.tick().await;

        tracing::info!(
            backend = self.cache.backend_type(),
            cleanup_interval_secs = self.interval.as_secs(),
            "Cache cleanup task started"
        );

        loop {
            tokio::select! {
                _ = self.shutdown.recv() => {
                    tracing::info!("Cache cleanup task received shutdown signal");
                    break;
                }
                _ = cleanup_timer.tick() => {
                    let removed = self.cache.cleanup_expired().await;
                    if removed > 0 {
                        tracing::info!(removed = removed, "Swept expired template cache entries");
                    }
                }
            }
        }

        tracing::info!("Cache cleanup task stopped");
    }
}
