//! Real-time tic-tac-toe rooms over WebSockets.
//!
//! Clients connect to `/ws`, join a room by id and exchange JSON intents
//! (`join`, `move`, `reset`). The engine seats players as X, O or spectator,
//! orders moves into a single turn sequence, detects wins and draws with
//! [`tictac_board::evaluate`], and pushes every state change to all sockets
//! in the room.
//!
//! # Architecture
//!
//! - **Registry**: process-wide room map with deferred deletion of empty rooms
//! - **Room**: board, turn, status, roster and score tally for one game
//! - **Gateway**: validates and applies intents, tracks connection membership
//! - **Broadcast**: serialize-once fan-out tolerant of dead sockets
//! - **Liveness**: ping/pong heartbeat that terminates silent sockets
//!
//! # Example
//!
//! ```no_run
//! use tictac_rooms::{RoomServer, ServerConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServerConfig::default().with_port(7777);
//! RoomServer::new(config).serve().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod broadcast;
mod cli;
mod config;
mod connection;
mod error;
mod gateway;
mod http;
mod ids;
mod liveness;
mod protocol;
mod registry;
mod room;
mod server;

// Crate-level exports - CLI and configuration
pub use cli::{Cli, Command};
pub use config::{ConfigError, ServerConfig};

// Crate-level exports - Engine
pub use broadcast::{broadcast, unicast};
pub use connection::{ConnectionHandle, DeliveryError, Outbound};
pub use error::{RegistryError, Rejection};
pub use gateway::{DEFAULT_NAME, Membership, SessionGateway};
pub use ids::{ConnectionId, PlayerId, RoomId};
pub use liveness::LivenessMonitor;
pub use registry::RoomRegistry;
pub use room::{Player, PlayerPresence, PlayerView, Room, RoomSnapshot, Scores, Status, Symbol};

// Crate-level exports - Wire protocol
pub use protocol::{Intent, ServerEvent, Winner, cell_index};

// Crate-level exports - HTTP surface
pub use http::{AppState, CreateRoomRequest, CreateRoomResponse, router};
pub use server::RoomServer;
