//! Tiered Cache - admin server
//!
//! Hosts a cache context over JSON values and serves its admin surface.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tiered_cache::api::{create_router, AppState};
use tiered_cache::pool::TcpConnector;
use tiered_cache::{CacheContext, Config};

/// Main entry point for the tiered cache admin server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the cache context (tiers, pool, maintenance task)
/// 4. Start the admin HTTP server on the configured port
/// 5. On SIGINT/SIGTERM, stop serving and shut the context down
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tiered_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tiered cache");

    let config = Config::from_env();
    info!(
        hot_tier_capacity = config.hot_tier_capacity,
        schema_tier_ttl_secs = config.schema_tier_ttl,
        query_tier_capacity = config.query_tier_capacity,
        query_tier_ttl_secs = config.query_tier_ttl,
        store_addr = %config.store_addr,
        admin_port = config.admin_port,
        "Configuration loaded"
    );

    let connector = TcpConnector::new(config.store_addr.clone(), config.probe_timeout());
    let context = CacheContext::<serde_json::Value, TcpConnector>::init(&config, connector)
        .await
        .context("initializing cache context")?;

    let app = create_router(AppState::new(context.observability()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.admin_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding admin listener on {}", addr))?;
    info!("Admin server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving admin API")?;

    context.shutdown().await;
    info!("Shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
