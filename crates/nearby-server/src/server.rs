//! Axum web server: WebSocket sessions, status API and static assets.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::config::{PushMode, ServerConfig};
use crate::error::Result;
use crate::hub::Hub;
use crate::ws::ws_handler;

/// Shared application state.
pub struct AppState {
    pub hub: Hub,
    pub config: ServerConfig,
}

/// The Nearby server.
pub struct NearbyServer {
    state: Arc<AppState>,
}

impl NearbyServer {
    /// Create a server with a fresh, empty registry.
    pub fn new(config: ServerConfig) -> Self {
        let hub = Hub::new(config.proximity, config.push_mode);
        Self {
            state: Arc::new(AppState { hub, config }),
        }
    }

    /// Shared state (for tests and embedding).
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Build the router for the server.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health))
            .route("/api/status", get(status_handler))
            // Participant sessions
            .route("/ws", get(ws_handler))
            // Everything else comes from the static directory
            .fallback_service(ServeDir::new(&self.state.config.static_dir))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(self.state())
    }

    /// Run the server until Ctrl-C.
    pub async fn serve(self) -> Result<()> {
        let addr = self.state.config.listen_addr;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Nearby server listening on http://{}", addr);
        tracing::info!("  Static: {:?}", self.state.config.static_dir);
        tracing::info!(
            "  Radius: {} m, stale after {} ms, push: {:?}",
            self.state.config.proximity.radius_meters,
            self.state.config.proximity.stale_after_millis(),
            self.state.config.push_mode,
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Nearby server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn health() -> &'static str {
    "OK"
}

/// Server status response.
#[derive(Debug, Serialize)]
struct StatusResponse {
    status: &'static str,
    participants: usize,
    sessions: usize,
    radius_meters: f64,
    stale_after_ms: u64,
    push_mode: PushMode,
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let proximity = state.hub.proximity();
    Json(StatusResponse {
        status: "ok",
        participants: state.hub.participant_count().await,
        sessions: state.hub.session_count().await,
        radius_meters: proximity.radius_meters,
        stale_after_ms: proximity.stale_after_millis(),
        push_mode: state.hub.push_mode(),
    })
}
