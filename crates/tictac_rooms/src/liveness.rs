//! Heartbeat that prunes dead connections.

use crate::connection::{ConnectionHandle, Outbound};
use crate::ids::ConnectionId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

#[derive(Debug)]
struct Probe {
    handle: ConnectionHandle,
    alive: bool,
}

/// Pings every open connection on a fixed interval.
///
/// A connection that has not answered the previous ping by the next sweep is
/// terminated through [`ConnectionHandle::terminate`]; its socket task then
/// runs the ordinary close path.
#[derive(Debug, Clone)]
pub struct LivenessMonitor {
    probes: Arc<Mutex<HashMap<ConnectionId, Probe>>>,
    interval: Duration,
}

impl LivenessMonitor {
    /// Creates a monitor sweeping every `interval`.
    #[instrument]
    pub fn new(interval: Duration) -> Self {
        Self {
            probes: Arc::new(Mutex::new(HashMap::new())),
            interval,
        }
    }

    fn probes(&self) -> MutexGuard<'_, HashMap<ConnectionId, Probe>> {
        self.probes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts watching a connection. New connections count as alive.
    pub fn register(&self, handle: &ConnectionHandle) {
        self.probes().insert(
            handle.id(),
            Probe {
                handle: handle.clone(),
                alive: true,
            },
        );
    }

    /// Stops watching a connection.
    pub fn unregister(&self, connection: ConnectionId) {
        self.probes().remove(&connection);
    }

    /// Marks a connection as alive after a pong.
    pub fn record_pong(&self, connection: ConnectionId) {
        if let Some(probe) = self.probes().get_mut(&connection) {
            probe.alive = true;
        }
    }

    /// Number of watched connections.
    pub fn len(&self) -> usize {
        self.probes().len()
    }

    /// True when no connection is watched.
    pub fn is_empty(&self) -> bool {
        self.probes().is_empty()
    }

    /// Runs one heartbeat cycle and returns the connections terminated.
    #[instrument(skip(self))]
    pub fn sweep(&self) -> Vec<ConnectionId> {
        let mut terminated = Vec::new();
        self.probes().retain(|id, probe| {
            if !probe.alive {
                warn!(connection = %id, "No pong since last heartbeat, terminating");
                probe.handle.terminate();
                terminated.push(*id);
                return false;
            }
            probe.alive = false;
            match probe.handle.send(Outbound::Ping) {
                Ok(()) => true,
                Err(e) => {
                    debug!(error = %e, "Dropping probe for closed connection");
                    false
                }
            }
        });
        terminated
    }

    /// Sweeps forever on the configured interval.
    pub async fn run(self) {
        info!(interval = ?self.interval, "Starting liveness monitor");
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let terminated = self.sweep();
            debug!(watched = self.len(), terminated = terminated.len(), "Heartbeat sweep done");
        }
    }
}
