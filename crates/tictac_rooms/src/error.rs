//! Error types for the room engine.

use derive_more::{Display, Error};
use tracing::instrument;

/// Why an intent was refused.
///
/// Rejections are reported only to the connection that sent the intent and
/// never change room state.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum Rejection {
    /// Missing or malformed field.
    #[display("{}", _0)]
    InvalidRequest(#[error(not(source))] String),
    /// Connection has not joined a room.
    #[display("not joined")]
    NotJoined,
    /// Move while the room is not `playing`.
    #[display("game not active")]
    GameNotActive,
    /// Move by a player whose symbol is not the current turn.
    #[display("not your turn")]
    OutOfTurn,
    /// Move onto a non-empty cell.
    #[display("cell taken")]
    CellOccupied,
}

impl Rejection {
    /// Shorthand for [`Rejection::InvalidRequest`].
    pub fn invalid(detail: impl Into<String>) -> Self {
        Self::InvalidRequest(detail.into())
    }
}

/// Registry failure, e.g. id space exhaustion.
#[derive(Debug, Clone, Display, Error)]
#[display("Registry error: {} at {}:{}", message, file, line)]
pub struct RegistryError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl RegistryError {
    /// Creates a new registry error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
