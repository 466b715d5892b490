//! WebSocket connection task.

use super::AppState;
use crate::connection::{ConnectionHandle, Outbound};
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{Instrument, debug, info, info_span, warn};

/// Longest a single outbound frame may wait on a peer that is not reading.
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest the close frame may take on a terminated connection.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// `GET /ws`: upgrades to a WebSocket and hands it to the gateway.
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

/// Pumps frames between one socket and the engine until either side closes.
///
/// Inbound text goes to the gateway; outbound frames come from the
/// connection's channel. Termination is watched separately from the frame
/// queue, including while a write is pending. Whatever ends the loop, close
/// handling runs once.
async fn handle_socket(state: AppState, socket: WebSocket) {
    let (handle, mut outbound) = ConnectionHandle::open();
    let id = handle.id();
    let span = info_span!("socket", connection = %id);

    async move {
        info!("Client connected");
        state.liveness.register(&handle);
        let (mut sink, mut stream) = socket.split();

        loop {
            tokio::select! {
                biased;
                () = handle.terminated() => {
                    info!("Connection terminated, closing socket");
                    if timeout(CLOSE_TIMEOUT, sink.send(Message::Close(None))).await.is_err() {
                        debug!("Close frame not delivered in time");
                    }
                    break;
                }
                frame = outbound.recv() => {
                    let message = match frame {
                        Some(Outbound::Text(text)) => Message::Text(text.into()),
                        Some(Outbound::Ping) => Message::Ping(Bytes::new()),
                        None => break,
                    };
                    if !deliver(&mut sink, message, &handle).await {
                        break;
                    }
                }
                msg = stream.next() => match msg {
                    Some(Ok(Message::Text(text))) => {
                        state.gateway.handle_text(&handle, text.as_str());
                    }
                    Some(Ok(Message::Pong(_))) => state.liveness.record_pong(id),
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        debug!(error = %e, "Socket read failed");
                        break;
                    }
                    Some(Ok(_)) => {}
                },
            }
        }

        state.liveness.unregister(id);
        state.gateway.disconnect(id);
        info!("Client disconnected");
    }
    .instrument(span)
    .await
}

/// Writes one frame. Returns false if the connection should be dropped.
async fn deliver(
    sink: &mut SplitSink<WebSocket, Message>,
    message: Message,
    handle: &ConnectionHandle,
) -> bool {
    tokio::select! {
        sent = timeout(SEND_TIMEOUT, sink.send(message)) => match sent {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                debug!(error = %e, "Socket write failed");
                false
            }
            Err(_) => {
                warn!(timeout = ?SEND_TIMEOUT, "Peer stopped reading, dropping connection");
                false
            }
        },
        () = handle.terminated() => {
            debug!("Terminated while a write was pending");
            false
        }
    }
}
