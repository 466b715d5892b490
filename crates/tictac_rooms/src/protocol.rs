//! Wire messages exchanged over the WebSocket.
//!
//! Every frame is a JSON object with a `type` discriminator. Inbound frames
//! are parsed leniently into an [`Intent`]; field validation is left to the
//! gateway so that a missing `roomId` can be answered with an error instead
//! of being dropped.

use crate::ids::{PlayerId, RoomId};
use crate::room::{PlayerView, Room, Scores, Status, Symbol};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tictac_board::{Board, Mark, Outcome};
use tracing::{debug, instrument};

/// A parsed client request.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Take a seat in a room.
    Join {
        /// Requested room; `None` when absent or not a string.
        room_id: Option<String>,
        /// Requested display name.
        name: Option<String>,
    },
    /// Place a mark; `index` is whatever the client sent.
    Move {
        /// Raw `index` field.
        index: Option<Value>,
    },
    /// Start a fresh game in the current room.
    Reset,
    /// A `type` this server does not understand.
    Unknown(String),
}

#[derive(Deserialize)]
struct JoinFields {
    #[serde(default, rename = "roomId")]
    room_id: Option<Value>,
    #[serde(default)]
    name: Option<Value>,
}

#[derive(Deserialize)]
struct MoveFields {
    #[serde(default)]
    index: Option<Value>,
}

impl Intent {
    /// Parses one inbound text frame.
    ///
    /// Returns `None` for anything that is not a JSON object with a string
    /// `type`; such frames are dropped without a reply.
    #[instrument(level = "debug", skip(raw), fields(len = raw.len()))]
    pub fn parse(raw: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(raw)
            .inspect_err(|e| debug!(error = %e, "Dropping malformed frame"))
            .ok()?;
        let kind = value.get("type")?.as_str()?.to_string();

        let intent = match kind.as_str() {
            "join" => {
                let fields: JoinFields = serde_json::from_value(value).ok()?;
                Intent::Join {
                    room_id: fields.room_id.and_then(string_field),
                    name: fields.name.and_then(string_field),
                }
            }
            "move" => {
                let fields: MoveFields = serde_json::from_value(value).ok()?;
                Intent::Move {
                    index: fields.index,
                }
            }
            "reset" => Intent::Reset,
            _ => Intent::Unknown(kind),
        };
        Some(intent)
    }
}

fn string_field(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        _ => None,
    }
}

/// Validates a raw move index: an integer in `0..=8`.
pub fn cell_index(index: Option<&Value>) -> Option<usize> {
    index
        .and_then(Value::as_u64)
        .filter(|i| *i < tictac_board::CELLS as u64)
        .map(|i| i as usize)
}

/// Winner field of an `update` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    /// X won.
    X,
    /// O won.
    O,
    /// Draw.
    #[serde(rename = "draw")]
    Draw,
}

impl Winner {
    /// Maps a board outcome; `None` while undecided.
    pub fn from_outcome(outcome: Outcome) -> Option<Self> {
        match outcome {
            Outcome::Win(Mark::X) => Some(Winner::X),
            Outcome::Win(Mark::O) => Some(Winner::O),
            Outcome::Draw => Some(Winner::Draw),
            Outcome::Undecided => None,
        }
    }
}

/// A message sent from the server to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Acknowledges a join to the joining connection.
    #[serde(rename_all = "camelCase")]
    Joined {
        /// Room joined.
        room_id: RoomId,
        /// New player's id.
        player_id: PlayerId,
        /// Assigned role.
        symbol: Symbol,
        /// Board cells.
        board: Board,
        /// Mark to move.
        turn: Mark,
        /// Room status.
        status: Status,
        /// Roster.
        players: Vec<PlayerView>,
        /// Score tally.
        scores: Scores,
    },
    /// Someone else joined.
    PlayerJoined {
        /// Updated roster.
        players: Vec<PlayerView>,
    },
    /// Someone left.
    PlayerLeft {
        /// Updated roster.
        players: Vec<PlayerView>,
    },
    /// Board state after a move or reset.
    #[serde(rename_all = "camelCase")]
    Update {
        /// Board cells.
        board: Board,
        /// Mark to move.
        turn: Mark,
        /// Room status.
        status: Status,
        /// Winner, if the game is over.
        winner: Option<Winner>,
        /// Completed line, if any.
        win_line: Option<[usize; 3]>,
        /// Score tally.
        scores: Scores,
    },
    /// An intent was rejected.
    Error {
        /// Human-readable reason.
        message: String,
    },
}

impl ServerEvent {
    /// `joined` acknowledgment for `player_id` in `room`.
    pub fn joined(room: &Room, player_id: PlayerId, symbol: Symbol) -> Self {
        ServerEvent::Joined {
            room_id: room.id().clone(),
            player_id,
            symbol,
            board: room.board().clone(),
            turn: room.turn(),
            status: room.status(),
            players: room.roster(),
            scores: room.scores(),
        }
    }

    /// `update` reflecting the room's current board and verdict.
    pub fn update(room: &Room) -> Self {
        let verdict = room.verdict();
        ServerEvent::Update {
            board: room.board().clone(),
            turn: room.turn(),
            status: room.status(),
            winner: Winner::from_outcome(verdict.outcome()),
            win_line: verdict.line(),
            scores: room.scores(),
        }
    }

    /// Serializes to a JSON text frame.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
