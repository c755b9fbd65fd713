//! Mock knowledge-base HTTP API.
//!
//! Serves the streaming search endpoint with the same SSE framing the client
//! consumes, plus the login, health and rating endpoints of the real service.
//! Sessions issued by `/api/login` live in an injected [`SessionStore`].

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use kb_api::StreamSettings;
use kb_session::SessionStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub mod config;
mod handlers;

pub use config::MockServerConfig;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    sessions: Arc<dyn SessionStore>,
    stream: StreamSettings,
}

impl AppState {
    pub fn new(sessions: Arc<dyn SessionStore>, stream: StreamSettings) -> Self {
        Self { sessions, stream }
    }

    pub fn sessions(&self) -> &dyn SessionStore {
        self.sessions.as_ref()
    }

    pub fn stream_settings(&self) -> &StreamSettings {
        &self.stream
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::login_page))
        .route("/home", get(handlers::home))
        .route("/health", get(handlers::health))
        .route("/api/login", post(handlers::login))
        .route("/token", get(handlers::token))
        .route("/unauthorized", get(handlers::unauthorized))
        .route("/stream", get(handlers::stream))
        .route("/add_rating", post(handlers::add_rating))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until the listener fails or `shutdown` resolves.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    state: AppState,
    shutdown: F,
) -> std::io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
