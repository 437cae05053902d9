use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use topol_email_templates::cache::create_template_cache;
use topol_email_templates::config::Settings;
use topol_email_templates::mail::LogMailSender;
use topol_email_templates::redis::RedisPool;
use topol_email_templates::server::{create_app, AppState};
use topol_email_templates::tasks::CacheCleanupTask;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    init_tracing();

    // Load configuration
    let settings = Settings::new()?;
    tracing::info!(
        api_base_url = %settings.api.base_url,
        cache_enabled = settings.cache.enabled,
        cache_backend = %settings.cache.backend,
        "Configuration loaded"
    );

    // Redis is only needed for the shared cache backend
    let redis_pool = if settings.cache.enabled && settings.cache.backend == "redis" {
        Some(Arc::new(RedisPool::new(settings.redis.clone())?))
    } else {
        None
    };

    let cache = create_template_cache(&settings.cache, redis_pool);
    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);

    // Redis expires entries itself; the sweep only matters in-process
    let cleanup_handle = if settings.cache.enabled && settings.cache.cleanup_interval_seconds > 0 {
        let task = CacheCleanupTask::new(
            cache.clone(),
            settings.cache.cleanup_interval_seconds,
            shutdown_tx.subscribe(),
        );
        Some(tokio::spawn(task.run()))
    } else {
        None
    };

    let sender = Arc::new(LogMailSender::new(settings.mail.default_from.clone()));

    // Create application state
    let state = AppState::new(settings.clone(), cache, sender)?;
    tracing::info!("Application state initialized");

    // Create Axum app
    let app = create_app(state);

    // Start server
    let addr = settings.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal_handler(shutdown_tx))
        .await?;

    // Wait for background tasks to finish
    if let Some(handle) = cleanup_handle {
        tracing::info!("Waiting for background tasks to finish...");
        let _ = handle.await;
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // LOG_FORMAT=json for log shippers
    let json = std::env::var("LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal_handler(shutdown_tx: tokio::sync::broadcast::Sender<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }

    // Stop background tasks
    let _ = shutdown_tx.send(());
}
