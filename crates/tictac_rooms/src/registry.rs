//! Process-wide map of rooms.

use crate::error::RegistryError;
use crate::ids::RoomId;
use crate::room::{Room, RoomSnapshot};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Attempts at drawing an unused room id before giving up.
const MAX_ID_ATTEMPTS: usize = 64;

/// Owns every live room.
///
/// Cloning is cheap and yields a handle to the same map. All room mutation
/// goes through [`RoomRegistry::with_room`] or
/// [`RoomRegistry::with_room_or_create`], which run the closure while holding
/// the registry lock, so each intent is applied as one uninterrupted step.
/// The lock is never held across an `.await`.
#[derive(Debug, Clone)]
pub struct RoomRegistry {
    rooms: Arc<Mutex<HashMap<RoomId, Room>>>,
    grace: Duration,
}

impl RoomRegistry {
    /// Creates an empty registry whose empty rooms live for `grace`.
    #[instrument]
    pub fn new(grace: Duration) -> Self {
        info!("Creating room registry");
        Self {
            rooms: Arc::new(Mutex::new(HashMap::new())),
            grace,
        }
    }

    /// Grace period before an empty room is deleted.
    pub fn grace(&self) -> Duration {
        self.grace
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RoomId, Room>> {
        self.rooms.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates a room under a freshly generated id.
    #[instrument(skip(self))]
    pub fn create_room(&self) -> Result<RoomId, RegistryError> {
        let mut rooms = self.lock();
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = RoomId::generate();
            if !rooms.contains_key(&id) {
                rooms.insert(id.clone(), Room::new(id.clone()));
                info!(room_id = %id, total = rooms.len(), "Created room");
                return Ok(id);
            }
        }
        warn!("Room id space exhausted");
        Err(RegistryError::new("could not allocate an unused room id"))
    }

    /// Snapshot of a room, or `None` if it does not exist.
    #[instrument(skip(self))]
    pub fn get_room(&self, id: &RoomId) -> Option<RoomSnapshot> {
        let snapshot = self.lock().get(id).map(Room::snapshot);
        if snapshot.is_none() {
            debug!(room_id = %id, "Room not found");
        }
        snapshot
    }

    /// True if the room exists.
    pub fn contains(&self, id: &RoomId) -> bool {
        self.lock().contains_key(id)
    }

    /// Runs `f` with exclusive access to an existing room.
    pub fn with_room<R>(&self, id: &RoomId, f: impl FnOnce(&mut Room) -> R) -> Option<R> {
        self.lock().get_mut(id).map(f)
    }

    /// Runs `f` with exclusive access to the room, creating it first if needed.
    pub fn with_room_or_create<R>(&self, id: &RoomId, f: impl FnOnce(&mut Room) -> R) -> R {
        let mut rooms = self.lock();
        let room = rooms.entry(id.clone()).or_insert_with(|| {
            info!(room_id = %id, "Creating room on demand");
            Room::new(id.clone())
        });
        f(room)
    }

    /// Deletes the room if its roster is empty. Returns whether it was deleted.
    #[instrument(skip(self))]
    pub fn remove_if_empty(&self, id: &RoomId) -> bool {
        self.remove_where(id, |_| true)
    }

    /// Deletes the room if it is empty and nobody has joined since the
    /// timer that calls this was started with `joins` recorded.
    fn remove_if_idle(&self, id: &RoomId, joins: usize) -> bool {
        self.remove_where(id, |room| {
            let idle = room.join_count() == joins;
            if !idle {
                debug!(room_id = %id, "Room was rejoined since this timer started, skipping");
            }
            idle
        })
    }

    fn remove_where(&self, id: &RoomId, idle: impl FnOnce(&Room) -> bool) -> bool {
        let mut rooms = self.lock();
        match rooms.get(id) {
            Some(room) if room.is_empty() => {
                if !idle(room) {
                    return false;
                }
                rooms.remove(id);
                info!(room_id = %id, remaining = rooms.len(), "Deleted empty room");
                true
            }
            Some(room) => {
                let players = room.players().len();
                debug!(room_id = %id, players, "Room repopulated, keeping it");
                false
            }
            None => false,
        }
    }

    /// Deletes the room after the grace period if it is still empty then.
    ///
    /// Each call starts its own timer. A timer only deletes the room if no
    /// player joined after it started, so only the timer from the most
    /// recent emptying can fire the deletion.
    ///
    /// Must be called from within a tokio runtime; otherwise the room is
    /// kept and a warning logged.
    #[instrument(skip(self))]
    pub fn schedule_deletion(&self, id: RoomId) {
        let Some(joins) = self.with_room(&id, |room| room.join_count()) else {
            return;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(room_id = %id, "No runtime available, room deletion not scheduled");
            return;
        };
        debug!(room_id = %id, grace = ?self.grace, joins, "Scheduling deletion of empty room");
        let registry = self.clone();
        runtime.spawn(async move {
            tokio::time::sleep(registry.grace).await;
            registry.remove_if_idle(&id, joins);
        });
    }

    /// Number of rooms.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when there are no rooms.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Ids of all rooms, sorted.
    pub fn room_ids(&self) -> Vec<RoomId> {
        let mut ids: Vec<_> = self.lock().keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}
