use std::sync::Arc;

use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

use ludico_client::{App, Config};

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env().expect("Invalid configuration");
    tracing::info!(api_url = %config.api_url, "Starting Ludico client");

    let app = App::build(config).await.expect("Failed to open local cache");
    tracing::info!("Local cache ready");

    match app.events.refresh().await {
        Ok(written) => tracing::info!(written, "Initial refresh done"),
        Err(e) => e.log(),
    }

    let probe = app.backend_probe().expect("Backend URL has no host");
    let sync = app.start_sync(Arc::new(probe));

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }

    tracing::info!("Shutting down");
    sync.shutdown().await;
}
