//! HTTP surface: WebSocket upgrade plus the small room API.

mod routes;
mod socket;

use crate::gateway::SessionGateway;
use crate::liveness::LivenessMonitor;
use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use routes::{CreateRoomRequest, CreateRoomResponse};

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Intent dispatcher over the room registry.
    pub gateway: SessionGateway,
    /// Heartbeat bookkeeping for open sockets.
    pub liveness: LivenessMonitor,
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(socket::ws_handler))
        .route("/create-room", post(routes::create_room))
        .route("/room/{id}", get(routes::get_room))
        .route("/health", get(routes::health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
