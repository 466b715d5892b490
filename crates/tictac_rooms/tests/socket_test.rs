//! End-to-end tests over real WebSocket connections.

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::time::Duration;
use tictac_rooms::{RoomId, RoomServer, ServerConfig, Status};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(5);

async fn spawn_server() -> (RoomServer, SocketAddr) {
    let server = RoomServer::new(ServerConfig::default());
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("listener has an address");
    let router = server.router();
    tokio::spawn(async move { axum::serve(listener, router).await });
    (server, addr)
}

async fn connect(addr: SocketAddr) -> Client {
    let (client, _) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("WebSocket handshake failed");
    client
}

async fn send(client: &mut Client, value: Value) {
    client
        .send(Message::text(value.to_string()))
        .await
        .expect("Failed to send frame");
}

/// Reads text frames until one of type `kind` arrives, skipping the rest.
async fn expect_event(client: &mut Client, kind: &str) -> Value {
    loop {
        let frame = timeout(WAIT, client.next())
            .await
            .unwrap_or_else(|_| panic!("timed out waiting for {kind}"));
        match frame {
            Some(Ok(Message::Text(text))) => {
                let value: Value = serde_json::from_str(text.as_str()).unwrap();
                if value["type"] == kind {
                    return value;
                }
            }
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
            other => panic!("socket ended while waiting for {kind}: {other:?}"),
        }
    }
}

async fn join(client: &mut Client, room: &str, name: &str) -> Value {
    send(client, json!({"type": "join", "roomId": room, "name": name})).await;
    expect_event(client, "joined").await
}

#[tokio::test]
async fn test_join_move_and_close_over_websocket() {
    let (server, addr) = spawn_server().await;
    let mut alice = connect(addr).await;
    let mut bob = connect(addr).await;

    assert_eq!(join(&mut alice, "arena", "Alice").await["symbol"], "X");
    assert_eq!(join(&mut bob, "arena", "Bob").await["symbol"], "O");
    let roster = expect_event(&mut alice, "player-joined").await;
    assert_eq!(roster["players"].as_array().unwrap().len(), 2);

    send(&mut alice, json!({"type": "move", "index": 4})).await;
    for client in [&mut alice, &mut bob] {
        let update = expect_event(client, "update").await;
        assert_eq!(update["board"][4], "X");
        assert_eq!(update["turn"], "O");
        assert_eq!(update["status"], "playing");
    }

    bob.close(None).await.expect("Failed to close");
    let left = expect_event(&mut alice, "player-left").await;
    assert_eq!(left["players"], json!([{
        "id": left["players"][0]["id"],
        "name": "Alice",
        "symbol": "X",
    }]));

    let snapshot = server
        .state()
        .gateway
        .registry()
        .get_room(&RoomId::from("arena"))
        .expect("room still open");
    assert_eq!(snapshot.status, Status::Waiting);
    assert_eq!(snapshot.players.len(), 1);
}

#[tokio::test]
async fn test_dropped_socket_runs_close_handling() {
    let (_server, addr) = spawn_server().await;
    let mut alice = connect(addr).await;
    let mut bob = connect(addr).await;
    join(&mut alice, "abrupt", "Alice").await;
    join(&mut bob, "abrupt", "Bob").await;

    drop(bob);

    let left = expect_event(&mut alice, "player-left").await;
    assert_eq!(left["players"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_silent_client_is_closed_and_announced() {
    let (server, addr) = spawn_server().await;
    let monitor = server.state().liveness.clone();
    let mut alice = connect(addr).await;
    let mut bob = connect(addr).await;
    join(&mut alice, "beat", "Alice").await;
    join(&mut bob, "beat", "Bob").await;
    assert_eq!(monitor.len(), 2);

    assert!(monitor.sweep().is_empty());

    // Alice answers; the error reply shows the server has read her pong.
    alice
        .send(Message::Pong(Default::default()))
        .await
        .expect("Failed to send pong");
    send(&mut alice, json!({"type": "move", "index": 99})).await;
    let error = expect_event(&mut alice, "error").await;
    assert_eq!(error["message"], "bad index");

    assert_eq!(monitor.sweep().len(), 1);

    let closed = timeout(WAIT, async {
        loop {
            match bob.next().await {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            }
        }
    })
    .await;
    assert!(closed.is_ok(), "silent client was never closed");

    let left = expect_event(&mut alice, "player-left").await;
    assert_eq!(left["players"].as_array().unwrap().len(), 1);
    assert_eq!(left["players"][0]["name"], "Alice");
    assert_eq!(monitor.len(), 1);
}
