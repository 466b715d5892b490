//! Room creation and lookup endpoints.

use super::AppState;
use crate::ids::RoomId;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, info, instrument};

/// Optional body of `POST /create-room`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    /// Name of the creator, used only for logging.
    #[serde(default)]
    pub name: Option<String>,
}

/// Reply to `POST /create-room`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    /// Id of the new room.
    pub room_id: RoomId,
}

/// `POST /create-room`: allocates an empty room.
///
/// The body is optional and may be anything; a JSON `name` is logged.
#[instrument(skip_all)]
pub async fn create_room(State(state): State<AppState>, body: Bytes) -> Response {
    let request: CreateRoomRequest = serde_json::from_slice(&body).unwrap_or_default();
    debug!(creator = ?request.name, "Create room requested");

    match state.gateway.registry().create_room() {
        Ok(room_id) => {
            info!(room_id = %room_id, "Room created over HTTP");
            Json(CreateRoomResponse { room_id }).into_response()
        }
        Err(e) => {
            error!(error = %e, "Room creation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.message })),
            )
                .into_response()
        }
    }
}

/// `GET /room/{id}`: snapshot of one room.
#[instrument(skip_all)]
pub async fn get_room(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    debug!(room_id = %id, "Room snapshot requested");
    match state.gateway.registry().get_room(&RoomId::from(id)) {
        Some(snapshot) => Json(snapshot).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" }))).into_response(),
    }
}

/// `GET /health`: liveness probe.
pub async fn health() -> &'static str {
    "ok"
}
