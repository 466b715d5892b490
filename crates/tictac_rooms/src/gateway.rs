//! Per-connection intent dispatch.

use crate::broadcast::{broadcast, unicast};
use crate::connection::ConnectionHandle;
use crate::error::Rejection;
use crate::ids::{ConnectionId, PlayerId, RoomId};
use crate::protocol::{Intent, ServerEvent, cell_index};
use crate::registry::RoomRegistry;
use crate::room::Symbol;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, instrument, warn};

/// Display name used when a client sends none.
pub const DEFAULT_NAME: &str = "Player";

/// Which room and player a connection is bound to.
#[derive(Debug, Clone, PartialEq, Eq, derive_new::new)]
pub struct Membership {
    /// Room the connection joined.
    pub room_id: RoomId,
    /// Player record created by the join.
    pub player_id: PlayerId,
}

/// Applies client intents to rooms and fans out the results.
///
/// One gateway is shared by every connection. It keeps a side table from
/// connection id to [`Membership`] so that non-join intents find their room
/// without scanning the registry.
#[derive(Debug, Clone)]
pub struct SessionGateway {
    registry: RoomRegistry,
    memberships: Arc<Mutex<HashMap<ConnectionId, Membership>>>,
    max_name_len: usize,
}

impl SessionGateway {
    /// Creates a gateway over `registry`.
    #[instrument(skip(registry))]
    pub fn new(registry: RoomRegistry, max_name_len: usize) -> Self {
        info!("Creating session gateway");
        Self {
            registry,
            memberships: Arc::new(Mutex::new(HashMap::new())),
            max_name_len,
        }
    }

    /// The registry this gateway mutates.
    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    fn memberships(&self) -> MutexGuard<'_, HashMap<ConnectionId, Membership>> {
        self.memberships
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Current membership of `connection`, if it has joined.
    pub fn membership(&self, connection: ConnectionId) -> Option<Membership> {
        self.memberships().get(&connection).cloned()
    }

    /// Symbol held by `connection`, if joined.
    pub fn symbol_of(&self, connection: ConnectionId) -> Option<Symbol> {
        let membership = self.membership(connection)?;
        self.registry
            .with_room(&membership.room_id, |room| {
                room.player(&membership.player_id).map(|p| p.symbol())
            })
            .flatten()
    }

    /// Handles one inbound text frame.
    ///
    /// Malformed frames are dropped. Rejections are reported to the sender
    /// as an `error` event.
    #[instrument(skip(self, connection, raw), fields(connection = %connection.id()))]
    pub fn handle_text(&self, connection: &ConnectionHandle, raw: &str) {
        let Some(intent) = Intent::parse(raw) else {
            return;
        };
        if let Err(rejection) = self.dispatch(connection, intent) {
            warn!(%rejection, "Intent rejected");
            unicast(
                connection,
                &ServerEvent::Error {
                    message: rejection.to_string(),
                },
            );
        }
    }

    /// Applies a parsed intent.
    pub fn dispatch(&self, connection: &ConnectionHandle, intent: Intent) -> Result<(), Rejection> {
        match intent {
            Intent::Join { room_id, name } => self.join(connection, room_id, name).map(|_| ()),
            Intent::Move { index } => self.make_move(connection, index.as_ref()),
            Intent::Reset => self.reset(connection),
            Intent::Unknown(kind) => {
                debug!(kind = %kind, "Ignoring unknown intent");
                Ok(())
            }
        }
    }

    /// Seats `connection` in `room_id`, creating the room if needed.
    ///
    /// Sends `joined` to the joiner and `player-joined` to everyone else. A
    /// connection that already sits in a room leaves it first.
    #[instrument(skip(self, connection), fields(connection = %connection.id()))]
    pub fn join(
        &self,
        connection: &ConnectionHandle,
        room_id: Option<String>,
        name: Option<String>,
    ) -> Result<Membership, Rejection> {
        let room_id = room_id
            .filter(|id| !id.is_empty())
            .map(RoomId::from)
            .ok_or_else(|| Rejection::invalid("roomId required"))?;

        if self.membership(connection.id()).is_some() {
            debug!("Connection switching seats, leaving previous room");
            self.disconnect(connection.id());
        }

        let name = self.display_name(name);
        let (player_id, symbol) = self.registry.with_room_or_create(&room_id, |room| {
            let player = room.add_player(name, connection.clone());
            let (player_id, symbol) = (player.id().clone(), player.symbol());

            unicast(connection, &ServerEvent::joined(room, player_id.clone(), symbol));
            broadcast(
                room,
                &ServerEvent::PlayerJoined {
                    players: room.roster(),
                },
                Some(connection.id()),
            );
            (player_id, symbol)
        });

        let membership = Membership::new(room_id, player_id);
        self.memberships()
            .insert(connection.id(), membership.clone());
        info!(
            room_id = %membership.room_id,
            player_id = %membership.player_id,
            %symbol,
            "Connection joined room"
        );
        Ok(membership)
    }

    /// Places the caller's mark at `index` and broadcasts the new state to
    /// the whole room, mover included.
    #[instrument(skip(self, connection), fields(connection = %connection.id()))]
    pub fn make_move(
        &self,
        connection: &ConnectionHandle,
        index: Option<&Value>,
    ) -> Result<(), Rejection> {
        let membership = self
            .membership(connection.id())
            .ok_or(Rejection::NotJoined)?;
        let index = cell_index(index).ok_or_else(|| Rejection::invalid("bad index"))?;

        self.registry
            .with_room(&membership.room_id, |room| {
                let verdict = room.apply_move(&membership.player_id, index)?;
                debug!(index, outcome = ?verdict.outcome(), "Move applied");
                broadcast(room, &ServerEvent::update(room), None);
                Ok(())
            })
            .unwrap_or(Err(Rejection::NotJoined))
    }

    /// Starts a new game in the caller's room. Anyone seated may reset.
    #[instrument(skip(self, connection), fields(connection = %connection.id()))]
    pub fn reset(&self, connection: &ConnectionHandle) -> Result<(), Rejection> {
        let membership = self
            .membership(connection.id())
            .ok_or(Rejection::NotJoined)?;

        self.registry
            .with_room(&membership.room_id, |room| {
                room.reset();
                broadcast(room, &ServerEvent::update(room), None);
            })
            .ok_or(Rejection::NotJoined)
    }

    /// Close handling: drops the connection's player, tells the rest of the
    /// room and schedules deletion once the room is empty.
    #[instrument(skip(self))]
    pub fn disconnect(&self, connection: ConnectionId) {
        let Some(membership) = self.memberships().remove(&connection) else {
            debug!("Closed connection had not joined");
            return;
        };

        let now_empty = self.registry.with_room(&membership.room_id, |room| {
            let left = room.remove_connection(connection);
            if left.is_some() {
                broadcast(
                    room,
                    &ServerEvent::PlayerLeft {
                        players: room.roster(),
                    },
                    None,
                );
            }
            room.is_empty()
        });

        match now_empty {
            Some(true) => self.registry.schedule_deletion(membership.room_id),
            Some(false) => {}
            None => debug!(room_id = %membership.room_id, "Room already gone"),
        }
    }

    /// Trims, defaults and truncates a client-supplied name.
    fn display_name(&self, name: Option<String>) -> String {
        let name = name.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return DEFAULT_NAME.to_string();
        }
        name.chars().take(self.max_name_len).collect()
    }
}
