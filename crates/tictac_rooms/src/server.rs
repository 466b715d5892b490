//! Server assembly: wires registry, gateway and liveness into the router.

use crate::config::ServerConfig;
use crate::gateway::SessionGateway;
use crate::http::{AppState, router};
use crate::liveness::LivenessMonitor;
use crate::registry::RoomRegistry;
use anyhow::{Context, Result};
use axum::Router;
use tracing::{info, instrument};

/// A configured, not yet listening, room server.
#[derive(Debug, Clone)]
pub struct RoomServer {
    config: ServerConfig,
    state: AppState,
}

impl RoomServer {
    /// Builds the engine components from `config`.
    #[instrument(skip(config), fields(host = %config.host(), port = config.port()))]
    pub fn new(config: ServerConfig) -> Self {
        let registry = RoomRegistry::new(config.room_grace());
        let gateway = SessionGateway::new(registry, *config.max_name_len());
        let liveness = LivenessMonitor::new(config.heartbeat_interval());
        info!("Room server assembled");
        Self {
            config,
            state: AppState { gateway, liveness },
        }
    }

    /// Shared handler state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Router serving this server's state.
    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    /// Binds and serves until Ctrl+C.
    #[instrument(skip(self))]
    pub async fn serve(self) -> Result<()> {
        let addr = format!("{}:{}", self.config.host(), self.config.port());
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        tokio::spawn(self.state.liveness.clone().run());

        info!(%addr, "Room server listening, WebSocket at /ws");
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server exited with error")?;

        let rooms = self.state.gateway.registry().room_ids();
        info!(open_rooms = ?rooms, "Room server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
