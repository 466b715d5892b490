//! Room aggregate: board, turn, status, roster and score tally.

use crate::connection::ConnectionHandle;
use crate::error::Rejection;
use crate::ids::{ConnectionId, PlayerId, RoomId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tictac_board::{Board, Mark, Outcome, Verdict, evaluate};
use tracing::{debug, info, instrument};

/// Role a participant holds in a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum Symbol {
    /// Plays X.
    X,
    /// Plays O.
    O,
    /// Watches only.
    #[serde(rename = "spectator")]
    #[strum(serialize = "spectator")]
    Spectator,
}

impl Symbol {
    /// The board mark for this symbol; spectators have none.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Symbol::X => Some(Mark::X),
            Symbol::O => Some(Mark::O),
            Symbol::Spectator => None,
        }
    }

    /// True for X and O.
    pub fn is_active(self) -> bool {
        self.mark().is_some()
    }
}

/// Lifecycle of the game in a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Status {
    /// Fewer than two players seated.
    Waiting,
    /// Two players seated, no verdict yet.
    Playing,
    /// Board carries a win or a draw.
    Finished,
}

/// Cumulative results for the lifetime of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scores {
    /// Wins for X.
    #[serde(rename = "X")]
    pub x: u32,
    /// Wins for O.
    #[serde(rename = "O")]
    pub o: u32,
    /// Drawn games.
    pub draw: u32,
}

impl Scores {
    /// Counts one finished game.
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win(Mark::X) => self.x += 1,
            Outcome::Win(Mark::O) => self.o += 1,
            Outcome::Draw => self.draw += 1,
            Outcome::Undecided => {}
        }
    }
}

/// A connected participant.
#[derive(Debug, Clone)]
pub struct Player {
    id: PlayerId,
    name: String,
    symbol: Symbol,
    connection: ConnectionHandle,
}

impl Player {
    /// Player id.
    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Assigned role.
    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    /// Outbound handle of the player's connection.
    pub fn connection(&self) -> &ConnectionHandle {
        &self.connection
    }

    /// Public view of this player.
    pub fn view(&self) -> PlayerView {
        PlayerView {
            id: self.id.clone(),
            name: self.name.clone(),
            symbol: self.symbol,
        }
    }
}

/// Roster entry as sent to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    /// Player id.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Assigned role.
    pub symbol: Symbol,
}

/// Roster entry in a room snapshot, with connection liveness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerPresence {
    /// Player id.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Assigned role.
    pub symbol: Symbol,
    /// Whether the player's connection is still open.
    pub connected: bool,
}

/// Read-only copy of a room's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    /// Room id.
    pub id: RoomId,
    /// Board cells.
    pub board: Board,
    /// Mark to move.
    pub turn: Mark,
    /// Lifecycle status.
    pub status: Status,
    /// Roster in join order.
    pub players: Vec<PlayerPresence>,
    /// Score tally.
    pub scores: Scores,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// One game instance.
#[derive(Debug, Clone)]
pub struct Room {
    id: RoomId,
    board: Board,
    turn: Mark,
    status: Status,
    players: Vec<Player>,
    scores: Scores,
    created_at: DateTime<Utc>,
    issued: HashSet<PlayerId>,
}

impl Room {
    /// Creates an empty room waiting for players.
    #[instrument]
    pub fn new(id: RoomId) -> Self {
        info!(room_id = %id, "Creating new room");
        Self {
            id,
            board: Board::new(),
            turn: Mark::X,
            status: Status::Waiting,
            players: Vec::new(),
            scores: Scores::default(),
            created_at: Utc::now(),
            issued: HashSet::new(),
        }
    }

    /// Room id.
    pub fn id(&self) -> &RoomId {
        &self.id
    }

    /// Current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Mark to move.
    pub fn turn(&self) -> Mark {
        self.turn
    }

    /// Lifecycle status.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Roster in join order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Score tally.
    pub fn scores(&self) -> Scores {
        self.scores
    }

    /// Number of players ever seated here, departed ones included.
    pub fn join_count(&self) -> usize {
        self.issued.len()
    }

    /// True when nobody is in the roster.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Verdict for the current board.
    pub fn verdict(&self) -> Verdict {
        evaluate(&self.board)
    }

    /// Public roster.
    pub fn roster(&self) -> Vec<PlayerView> {
        self.players.iter().map(Player::view).collect()
    }

    /// Looks up a player by id.
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    /// Symbol the next joiner would get: X if free, then O, then spectator.
    pub fn next_symbol(&self) -> Symbol {
        let taken = |symbol: Symbol| self.players.iter().any(|p| p.symbol == symbol);
        if !taken(Symbol::X) {
            Symbol::X
        } else if !taken(Symbol::O) {
            Symbol::O
        } else {
            Symbol::Spectator
        }
    }

    /// Seats a new player and returns it.
    ///
    /// The player id is never reused within this room, even after the
    /// previous holder left.
    #[instrument(skip(self, connection), fields(room_id = %self.id, connection = %connection.id()))]
    pub fn add_player(&mut self, name: String, connection: ConnectionHandle) -> &Player {
        let symbol = self.next_symbol();
        let id = loop {
            let candidate = PlayerId::generate();
            if self.issued.insert(candidate.clone()) {
                break candidate;
            }
        };

        info!(player_id = %id, name = %name, %symbol, "Player joined room");
        self.players.push(Player {
            id,
            name,
            symbol,
            connection,
        });
        self.refresh_status();

        let last = self.players.len() - 1;
        &self.players[last]
    }

    /// Removes the player bound to `connection`, if any.
    #[instrument(skip(self), fields(room_id = %self.id))]
    pub fn remove_connection(&mut self, connection: ConnectionId) -> Option<Player> {
        let idx = self
            .players
            .iter()
            .position(|p| p.connection.id() == connection)?;
        let player = self.players.remove(idx);
        info!(player_id = %player.id, symbol = %player.symbol, "Player left room");
        self.refresh_status();
        Some(player)
    }

    /// Number of X/O players seated.
    pub fn active_count(&self) -> usize {
        self.players.iter().filter(|p| p.symbol.is_active()).count()
    }

    /// Recomputes `status` from the roster and the board.
    ///
    /// Two active players means `playing`, unless the board already has a
    /// verdict, in which case the room stays `finished` until a reset.
    pub fn refresh_status(&mut self) {
        let status = if self.active_count() != 2 {
            Status::Waiting
        } else if self.verdict().is_terminal() {
            Status::Finished
        } else {
            Status::Playing
        };
        if status != self.status {
            debug!(room_id = %self.id, from = %self.status, to = %status, "Room status changed");
            self.status = status;
        }
    }

    /// Applies a move by `player_id` at `index`.
    ///
    /// Checks, in order: game active, player's turn, cell empty. Nothing is
    /// mutated on rejection. On a win or draw the room is finished and the
    /// tally updated exactly once.
    #[instrument(skip(self), fields(room_id = %self.id))]
    pub fn apply_move(&mut self, player_id: &PlayerId, index: usize) -> Result<Verdict, Rejection> {
        let symbol = self
            .player(player_id)
            .map(Player::symbol)
            .ok_or(Rejection::NotJoined)?;

        if self.status != Status::Playing {
            return Err(Rejection::GameNotActive);
        }
        let mark = symbol
            .mark()
            .filter(|mark| *mark == self.turn)
            .ok_or(Rejection::OutOfTurn)?;
        if !self.board.is_empty_at(index) {
            return Err(match self.board.get(index) {
                None => Rejection::invalid("bad index"),
                Some(_) => Rejection::CellOccupied,
            });
        }

        self.board
            .place(index, mark)
            .map_err(|e| Rejection::invalid(e.to_string()))?;
        self.turn = mark.opponent();
        debug!(index, %mark, board = %self.board.display(), "Move applied");

        let verdict = self.verdict();
        if verdict.is_terminal() {
            self.status = Status::Finished;
            self.scores.record(verdict.outcome());
            info!(outcome = ?verdict.outcome(), scores = ?self.scores, "Game finished");
        }
        Ok(verdict)
    }

    /// Clears the board for a new game. Scores are kept.
    #[instrument(skip(self), fields(room_id = %self.id))]
    pub fn reset(&mut self) {
        self.board.clear();
        self.turn = Mark::X;
        self.status = if self.active_count() == 2 {
            Status::Playing
        } else {
            Status::Waiting
        };
        info!(status = %self.status, "Board reset");
    }

    /// Read-only copy for the HTTP surface.
    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            id: self.id.clone(),
            board: self.board.clone(),
            turn: self.turn,
            status: self.status,
            players: self
                .players
                .iter()
                .map(|p| PlayerPresence {
                    id: p.id.clone(),
                    name: p.name.clone(),
                    symbol: p.symbol,
                    connected: p.connection.is_open(),
                })
                .collect(),
            scores: self.scores,
            created_at: self.created_at,
        }
    }
}
