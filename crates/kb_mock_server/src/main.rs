use std::io;
use std::sync::Arc;

use kb_mock_server::{serve_with_shutdown, AppState, MockServerConfig};
use kb_session::InMemorySessionStore;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = MockServerConfig::from_env();
    let listener = TcpListener::bind(config.bind_addr()).await?;
    info!(
        addr = %listener.local_addr()?,
        citation_cap = config.stream.citation_cap,
        "mock knowledge-base API listening"
    );

    let state = AppState::new(Arc::new(InMemorySessionStore::new()), config.stream);
    serve_with_shutdown(listener, state, shutdown_signal()).await?;
    info!("mock knowledge-base API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "failed to listen for ctrl-c; serving until killed");
        std::future::pending::<()>().await;
    }
}
