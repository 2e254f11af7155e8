mod config;
mod server;
mod signals;

use crate::config::BulkdConfig;
use crate::server::AppState;
use crate::signals::ShutdownSignals;
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = BulkdConfig::parse();
    let state = Arc::new(AppState::new(&config)?);
    let app = server::router(Arc::clone(&state));
    let signals = ShutdownSignals::register()?;

    let listener = TcpListener::bind((config.bind, config.port)).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(signals.recv())
        .await?;

    // Drain after the server stops accepting requests, before exit
    info!("HTTP server closed, draining buffered batches");
    state.drain().await;
    info!("Drained, bye");

    Ok(())
}
