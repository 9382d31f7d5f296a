//! # Store API Server
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  .env ─► AppConfig ─► Database + DocumentStore (migrations applied)     │
//! │                              │                                          │
//! │                              ▼                                          │
//! │         TcpListener ─► axum::serve(router) ─► graceful shutdown         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::Path;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use store_api::config::AppConfig;
use store_api::{build_router, AppState};
use store_db::{Database, DocumentStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing .env is fine
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("store_api=info,store_db=info,tower_http=info")),
        )
        .with_target(true)
        .init();

    info!("Starting Store API server...");

    let config = AppConfig::load().context("loading configuration")?;
    info!(
        port = config.port,
        database = %config.database_path.display(),
        documents = %config.documents_path.display(),
        "Configuration loaded"
    );

    ensure_parent_dir(&config.database_path)?;
    ensure_parent_dir(&config.documents_path)?;

    let db = Database::new(config.relational_db())
        .await
        .context("opening relational store")?;
    let docs = DocumentStore::new(config.document_db())
        .await
        .context("opening document store")?;
    info!("Stores ready");

    let app = build_router(AppState::new(db.clone(), docs.clone()));

    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    db.close().await;
    docs.close().await;
    info!("Server shutdown complete");
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
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
