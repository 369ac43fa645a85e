use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use astro_relay::{create_router, logging, AppState, Provider, RelayConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = RelayConfig::parse();
    logging::init(config.log_format);

    let provider = Provider::from_config(&config).context("invalid provider configuration")?;
    info!(
        provider = provider.name(),
        model = %config.model(),
        "Relay configured"
    );

    let app = create_router(AppState::new(provider));
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!("Listening on http://{}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
