//! HN Aggregator - A read-through caching aggregator for the Hacker News API

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hn_aggregator::api::create_router;
use hn_aggregator::upstream::HnClient;
use hn_aggregator::{spawn_cleanup_task, AppState, Config};

/// Main entry point for the aggregator server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the upstream client and shared entity cache
/// 4. Start background TTL sweep task
/// 5. Create Axum router with all endpoints
/// 6. Serve until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hn_aggregator=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting HN Aggregator");

    let config = Config::from_env();
    info!(
        "Configuration loaded: upstream={}, mode={:?}, max_concurrent_fetches={}, item_ttl={}s, user_ttl={}s, port={}",
        config.upstream_base_url,
        config.listing_mode,
        config.max_concurrent_fetches,
        config.item_ttl,
        config.user_ttl,
        config.server_port
    );

    let client = HnClient::new(
        config.upstream_base_url.clone(),
        Duration::from_secs(config.upstream_timeout),
    )
    .context("failed to build upstream HTTP client")?;

    let state = AppState::from_config(&config, Arc::new(client));
    info!("Entity cache initialized");

    let sweep_handle = (config.cleanup_interval > 0).then(|| {
        spawn_cleanup_task(
            state.cache().clone(),
            Duration::from_secs(config.cleanup_interval),
        )
    });

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweep_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the sweep task.
async fn shutdown_signal(sweep_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
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

    if let Some(handle) = sweep_handle {
        handle.abort();
        warn!("TTL sweep task aborted");
    }
}
