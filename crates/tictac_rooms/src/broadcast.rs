//! Fan-out of server events to the connections of a room.

use crate::connection::{ConnectionHandle, Outbound};
use crate::ids::ConnectionId;
use crate::protocol::ServerEvent;
use crate::room::Room;
use tracing::{debug, error, instrument};

/// Sends `event` to every open connection in `room`, except `exclude`.
///
/// The event is serialized once. A failed delivery is logged and skipped;
/// it never stops delivery to the others. Returns the number of connections
/// the frame was queued for.
#[instrument(skip(room, event), fields(room_id = %room.id()))]
pub fn broadcast(room: &Room, event: &ServerEvent, exclude: Option<ConnectionId>) -> usize {
    let Some(text) = serialize(event) else {
        return 0;
    };

    let delivered = room
        .players()
        .iter()
        .map(|p| p.connection())
        .filter(|conn| Some(conn.id()) != exclude && conn.is_open())
        .map(|conn| conn.send(Outbound::Text(text.clone())))
        .filter_map(|res| {
            res.inspect_err(|e| debug!(error = %e, "Broadcast delivery failed"))
                .ok()
        })
        .count();

    debug!(delivered, "Broadcast sent");
    delivered
}

/// Sends `event` to a single connection, ignoring delivery failure.
#[instrument(skip(connection, event), fields(connection = %connection.id()))]
pub fn unicast(connection: &ConnectionHandle, event: &ServerEvent) -> bool {
    let Some(text) = serialize(event) else {
        return false;
    };
    connection
        .send(Outbound::Text(text))
        .inspect_err(|e| debug!(error = %e, "Unicast delivery failed"))
        .is_ok()
}

fn serialize(event: &ServerEvent) -> Option<String> {
    event
        .to_json()
        .inspect_err(|e| error!(error = %e, "Failed to serialize event"))
        .ok()
}
