//! # TruEstate API server
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ApiConfig::load()        defaults < truestate.toml < env              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  tracing subscriber       RUST_LOG, else config.log_level              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::connect()      backoff until the retry window closes        │
//! │       │                   (fatal if the database never answers)        │
//! │       ▼                                                                 │
//! │  axum::serve()            until Ctrl+C / SIGTERM, then drain           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::close()                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use truestate_api::{build_router, ApiConfig, AppState};
use truestate_db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ApiConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting TruEstate API server...");
    info!(?config, "Configuration loaded");

    // Connect to database
    let db = Database::connect(config.db_config())
        .await
        .context("Could not connect to PostgreSQL")?;

    // Create shared state
    let state = Arc::new(AppState::new(
        Arc::new(db.transactions()),
        config.clone(),
    ));
    let app = build_router(state);

    // Start server
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "Listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    db.close().await;
    served.context("HTTP server failed")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(?e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(?e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
