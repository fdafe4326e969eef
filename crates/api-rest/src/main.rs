//! Standalone development backend binary.
//!
//! ## Purpose
//! Runs the in-memory hospital REST backend on its own.
//!
//! ## Intended use
//! Point the `hops` CLI (or any other client of the hospital API) at it during development. The
//! workspace's main `hops-run` binary serves the same router with `.env` support.

use api_rest::{serve, AppState, Store};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the HOPS development backend
///
/// # Environment Variables
/// - `HOPS_DEV_ADDR`: Server address (default: "0.0.0.0:5000")
/// - `HOPS_SEED_FILE`: Optional YAML file of records keyed by collection path
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the seed file cannot be read or parsed,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("HOPS_DEV_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".into());

    let store = match std::env::var("HOPS_SEED_FILE").ok().map(PathBuf::from) {
        Some(path) => Store::load_seed(&path)?,
        None => Store::new(),
    };

    tracing::info!("-- Starting HOPS development backend on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve(listener, AppState::new(store), async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await?;

    Ok(())
}
