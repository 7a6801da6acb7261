use anyhow::Context;
use tracing::{info, warn};

use receiptlens_server::{app, telemetry, AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();

    let config = ServerConfig::load().context("Failed to load configuration")?;
    if config.google.api_key.is_none() {
        warn!("GOOGLE_CLOUD_API_KEY is not set; uploads will be rejected");
    }

    let state = AppState::from_config(&config).context("Failed to build HTTP client")?;
    let router = app(state, config.body_limit_bytes);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!(addr = %listener.local_addr()?, "receiptlens listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("receiptlens stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
