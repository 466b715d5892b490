//! Tests for the HTTP room API.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tictac_rooms::{ConnectionHandle, RoomServer, ServerConfig};
use tower::ServiceExt;

async fn send(server: &RoomServer, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = server
        .router()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("body readable")
        .to_bytes()
        .to_vec();
    (status, body)
}

async fn create_room(server: &RoomServer, body: Body) -> String {
    let request = Request::builder()
        .method("POST")
        .uri("/create-room")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .unwrap();
    let (status, body) = send(server, request).await;
    assert_eq!(status, StatusCode::OK);
    let value: Value = serde_json::from_slice(&body).unwrap();
    value["roomId"].as_str().expect("roomId is a string").to_string()
}

async fn get_json(server: &RoomServer, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, body) = send(server, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_create_room_then_fetch_snapshot() {
    let server = RoomServer::new(ServerConfig::default());

    let room_id = create_room(&server, Body::empty()).await;
    assert_eq!(room_id.len(), 7);

    let (status, snapshot) = get_json(&server, &format!("/room/{room_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["id"], room_id);
    assert_eq!(snapshot["turn"], "X");
    assert_eq!(snapshot["status"], "waiting");
    assert_eq!(snapshot["players"], json!([]));
    assert_eq!(snapshot["scores"], json!({"X": 0, "O": 0, "draw": 0}));
    assert!(snapshot["createdAt"].is_string());
}

#[tokio::test]
async fn test_create_room_accepts_name_body() {
    let server = RoomServer::new(ServerConfig::default());
    let body = Body::from(json!({"name": "Alice"}).to_string());

    let room_id = create_room(&server, body).await;

    assert!(
        server
            .state()
            .gateway
            .registry()
            .contains(&room_id.as_str().into())
    );
}

#[tokio::test]
async fn test_unknown_room_is_404() {
    let server = RoomServer::new(ServerConfig::default());

    let (status, body) = get_json(&server, "/room/missing").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "not found"}));
}

#[tokio::test]
async fn test_snapshot_reports_connection_liveness() {
    let server = RoomServer::new(ServerConfig::default());
    let room_id = create_room(&server, Body::empty()).await;
    let gateway = server.state().gateway.clone();

    let (alice, _rx_a) = ConnectionHandle::open();
    let (bob, rx_b) = ConnectionHandle::open();
    for (handle, name) in [(&alice, "Alice"), (&bob, "Bob")] {
        let msg = json!({"type": "join", "roomId": room_id, "name": name});
        gateway.handle_text(handle, &msg.to_string());
    }
    drop(rx_b);

    let (_, snapshot) = get_json(&server, &format!("/room/{room_id}")).await;
    assert_eq!(snapshot["status"], "playing");
    assert_eq!(
        snapshot["players"],
        json!([
            {"id": snapshot["players"][0]["id"], "name": "Alice", "symbol": "X", "connected": true},
            {"id": snapshot["players"][1]["id"], "name": "Bob", "symbol": "O", "connected": false},
        ])
    );
}

#[tokio::test]
async fn test_health() {
    let server = RoomServer::new(ServerConfig::default());
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, body) = send(&server, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}
