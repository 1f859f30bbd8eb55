//! Room CRUD routes.
//!
//! SYSTEM CONTEXT
//! ==============
//! Plain persistence plumbing around the `RoomStore`. The one place this
//! touches the real-time core is manual deletion: on success the session
//! manager notifies current members and disarms any pending automatic
//! deletion for the room.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::event::Line;
use crate::services::room::{Room, RoomError};
use crate::state::AppState;

fn default_creator() -> String {
    "anonymous".into()
}

#[derive(Deserialize)]
pub struct CreateRoomBody {
    pub name: String,
    #[serde(default = "default_creator")]
    pub creator_id: String,
}

#[derive(Deserialize)]
pub struct DeleteRoomParams {
    #[serde(default)]
    pub creator_id: Option<String>,
}

#[derive(Deserialize)]
pub struct SaveStateBody {
    pub whiteboard_state: Vec<Line>,
}

/// `POST /api/rooms` — create a room.
pub async fn create_room(
    State(state): State<AppState>,
    Json(body): Json<CreateRoomBody>,
) -> Result<(StatusCode, Json<Room>), StatusCode> {
    let room = state
        .store
        .create_room(&body.name, &body.creator_id)
        .await
        .map_err(room_error_to_status)?;
    tracing::info!(room_id = %room.id, name = %room.name, "room created");
    Ok((StatusCode::CREATED, Json(room)))
}

/// `GET /api/rooms/:id` — fetch a room with its whiteboard state.
pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<Uuid>,
) -> Result<Json<Room>, StatusCode> {
    let room = state
        .store
        .get_room(room_id)
        .await
        .map_err(room_error_to_status)?;
    Ok(Json(room))
}

/// `DELETE /api/rooms/:id?creator_id=` — creator-initiated deletion.
///
/// On success, everyone still in the room is told, and any pending automatic
/// deletion is cancelled so it cannot fire against the already-deleted room.
pub async fn delete_room(
    State(state): State<AppState>,
    Path(room_id): Path<Uuid>,
    Query(params): Query<DeleteRoomParams>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let creator_id = params.creator_id.unwrap_or_default();
    state
        .store
        .delete_room(room_id, &creator_id)
        .await
        .map_err(room_error_to_status)?;

    state.sessions.room_deleted_by_creator(room_id).await;
    tracing::info!(%room_id, "room deleted by creator");
    Ok(Json(serde_json::json!({ "message": "Room deleted successfully" })))
}

/// `PUT /api/rooms/:id/state` — replace the persisted whiteboard state.
pub async fn save_room_state(
    State(state): State<AppState>,
    Path(room_id): Path<Uuid>,
    Json(body): Json<SaveStateBody>,
) -> Result<Json<Room>, StatusCode> {
    let room = state
        .store
        .save_room_state(room_id, &body.whiteboard_state)
        .await
        .map_err(room_error_to_status)?;
    Ok(Json(room))
}

pub(crate) fn room_error_to_status(err: RoomError) -> StatusCode {
    match err {
        RoomError::NotFound(_) => StatusCode::NOT_FOUND,
        RoomError::Forbidden(_) => StatusCode::FORBIDDEN,
        RoomError::Timeout | RoomError::Database(_) => {
            tracing::error!(error = %err, "room store call failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
#[path = "rooms_test.rs"]
mod tests;
