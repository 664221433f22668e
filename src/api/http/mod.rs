// src/api/http/mod.rs

pub mod analyze;
pub mod chat;
pub mod router;
pub mod status;

pub use router::create_router;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::RelayConfig;
use crate::state::AppState;

/// Bind and serve until ctrl-c.
pub async fn serve(config: RelayConfig) -> Result<()> {
    let bind_address = config.bind_address();
    let app = create_router(AppState::new(config));

    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;
    info!("Relay listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Relay shut down");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
