use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, Store, serve};

/// Main entry point for the HOPS runner
///
/// Loads `.env`, then serves the in-memory hospital backend that the `hops` CLI and the core view
/// models talk to during development. Stops cleanly on Ctrl-C.
///
/// # Environment Variables
/// - `HOPS_DEV_ADDR`: backend address (default: "0.0.0.0:5000")
/// - `HOPS_SEED_FILE`: optional YAML file of records keyed by collection path
///
/// # Returns
/// * `Ok(())` - If the server starts and shuts down cleanly
/// * `Err(anyhow::Error)` - If seeding, binding or serving fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hops=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("HOPS_DEV_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".into());
    let store = match std::env::var("HOPS_SEED_FILE").ok().map(PathBuf::from) {
        Some(path) => Store::load_seed(&path)?,
        None => {
            tracing::info!("no HOPS_SEED_FILE set; starting with empty collections");
            Store::new()
        }
    };

    tracing::info!("++ Starting HOPS development backend on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve(listener, AppState::new(store), async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for shutdown signal: {}", e);
        }
        tracing::info!("-- Shutting down");
    })
    .await?;

    Ok(())
}
