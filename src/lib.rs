//! iftriage -- Interface health analytics for device syslog events.
//!
//! This crate provides the core library for event categorization, flapping
//! detection, stability scoring, and dashboard aggregation, plus the SQLite
//! event store and HTTP API that surround them.

pub mod analysis;
pub mod api;
pub mod config;
pub mod event;
pub mod ingest;
pub mod store;

use anyhow::Result;
use config::AppConfig;

/// Start the iftriage daemon: event store + analysis API server.
pub async fn serve(bind: &str, db_path: &str, config: AppConfig) -> Result<()> {
    // 1. Initialize Storage
    tracing::info!(%db_path, "Initializing event database");
    let pool = store::open_pool(db_path)?;

    // 2. Start API Server
    let addr: std::net::SocketAddr = bind.parse()?;
    let state = api::state::AppState {
        pool,
        analysis: config.analysis,
    };
    let app = api::router(state);

    tracing::info!(%addr, "iftriage listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
