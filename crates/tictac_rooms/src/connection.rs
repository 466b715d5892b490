//! Outbound side of a client connection.

use crate::ids::ConnectionId;
use derive_more::{Display, Error};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio_util::sync::CancellationToken;

/// Instruction for a connection's socket task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Deliver a serialized event as a text frame.
    Text(String),
    /// Send a heartbeat probe.
    Ping,
}

/// The connection's socket task has gone away.
#[derive(Debug, Clone, Copy, Display, Error)]
#[display("connection {} is closed", connection)]
pub struct DeliveryError {
    /// Connection that could not be reached.
    pub connection: ConnectionId,
}

/// Non-owning handle used to push frames to one connection.
///
/// The socket task owns the receiving half; once it exits every send through
/// this handle fails with [`DeliveryError`]. Termination does not travel
/// through the frame queue, so it reaches a socket task that is stuck
/// writing to a peer that stopped reading.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    tx: UnboundedSender<Outbound>,
    shutdown: CancellationToken,
}

impl ConnectionHandle {
    /// Creates a handle with a fresh id and returns it with its receiver.
    pub fn open() -> (Self, UnboundedReceiver<Outbound>) {
        let (tx, rx) = unbounded_channel();
        let handle = Self {
            id: ConnectionId::next(),
            tx,
            shutdown: CancellationToken::new(),
        };
        (handle, rx)
    }

    /// Connection id.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// True until the receiving side is dropped.
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Queues `frame` for the socket task.
    pub fn send(&self, frame: Outbound) -> Result<(), DeliveryError> {
        self.tx.send(frame).map_err(|_| DeliveryError {
            connection: self.id,
        })
    }

    /// Asks the socket task to close the socket and run close handling.
    pub fn terminate(&self) {
        self.shutdown.cancel();
    }

    /// True once [`ConnectionHandle::terminate`] has been called.
    pub fn is_terminated(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Resolves when the connection is terminated.
    pub async fn terminated(&self) {
        self.shutdown.cancelled().await
    }
}
