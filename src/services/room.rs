//! Room store — durable persistence for room documents.
//!
//! DESIGN
//! ======
//! The real-time core only ever references rooms by id, so persistence hides
//! behind the `RoomStore` trait and the rest of the crate takes
//! `Arc<dyn RoomStore>`. Production uses Postgres; tests swap in an
//! in-memory store.
//!
//! ERROR HANDLING
//! ==============
//! Every call is wrapped in a bounded timeout. A timeout or database error is
//! transient: callers log it and carry on — it must never corrupt the
//! in-memory presence or cleanup state.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::event::Line;

// =============================================================================
// TYPES
// =============================================================================

/// A persisted room document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub name: String,
    pub creator_id: String,
    /// Ordered strokes; draw order matters for replay.
    pub whiteboard_state: Vec<Line>,
}

#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    #[error("room not found: {0}")]
    NotFound(Uuid),
    #[error("only the room creator can delete room {0}")]
    Forbidden(Uuid),
    #[error("store call timed out")]
    Timeout,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

// =============================================================================
// TRAIT
// =============================================================================

/// Durable store for room documents.
#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn create_room(&self, name: &str, creator_id: &str) -> Result<Room, RoomError>;

    async fn get_room(&self, room_id: Uuid) -> Result<Room, RoomError>;

    /// Delete a room on behalf of a user. Fails with `Forbidden` unless
    /// `creator_id` matches the stored creator.
    async fn delete_room(&self, room_id: Uuid, creator_id: &str) -> Result<(), RoomError>;

    /// System-initiated deletion for automatic teardown. No creator check,
    /// and deleting an already-absent room is not an error.
    async fn delete_room_unchecked(&self, room_id: Uuid) -> Result<(), RoomError>;

    /// Replace the persisted whiteboard state. Last write wins.
    async fn save_room_state(&self, room_id: Uuid, whiteboard_state: &[Line]) -> Result<Room, RoomError>;
}

// =============================================================================
// POSTGRES IMPLEMENTATION
// =============================================================================

pub struct PgRoomStore {
    pool: PgPool,
    call_timeout: Duration,
}

impl PgRoomStore {
    #[must_use]
    pub fn new(pool: PgPool, call_timeout: Duration) -> Self {
        Self { pool, call_timeout }
    }

    /// Bound a store call; elapsed time becomes `RoomError::Timeout`.
    async fn bounded<T, F>(&self, fut: F) -> Result<T, RoomError>
    where
        F: Future<Output = Result<T, RoomError>> + Send,
    {
        match tokio::time::timeout(self.call_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(RoomError::Timeout),
        }
    }
}

type RoomRow = (Uuid, String, String, Json<Vec<Line>>);

fn row_to_room((id, name, creator_id, Json(whiteboard_state)): RoomRow) -> Room {
    Room { id, name, creator_id, whiteboard_state }
}

#[async_trait]
impl RoomStore for PgRoomStore {
    async fn create_room(&self, name: &str, creator_id: &str) -> Result<Room, RoomError> {
        let id = Uuid::new_v4();
        self.bounded(async {
            sqlx::query("INSERT INTO rooms (id, name, creator_id, whiteboard_state) VALUES ($1, $2, $3, '[]'::jsonb)")
                .bind(id)
                .bind(name)
                .bind(creator_id)
                .execute(&self.pool)
                .await?;
            Ok(Room {
                id,
                name: name.to_owned(),
                creator_id: creator_id.to_owned(),
                whiteboard_state: Vec::new(),
            })
        })
        .await
    }

    async fn get_room(&self, room_id: Uuid) -> Result<Room, RoomError> {
        self.bounded(async {
            let row = sqlx::query_as::<_, RoomRow>(
                "SELECT id, name, creator_id, whiteboard_state FROM rooms WHERE id = $1",
            )
            .bind(room_id)
            .fetch_optional(&self.pool)
            .await?;

            row.map(row_to_room).ok_or(RoomError::NotFound(room_id))
        })
        .await
    }

    async fn delete_room(&self, room_id: Uuid, creator_id: &str) -> Result<(), RoomError> {
        self.bounded(async {
            let stored: Option<String> = sqlx::query_scalar("SELECT creator_id FROM rooms WHERE id = $1")
                .bind(room_id)
                .fetch_optional(&self.pool)
                .await?;

            let Some(stored) = stored else {
                return Err(RoomError::NotFound(room_id));
            };
            if stored != creator_id {
                return Err(RoomError::Forbidden(room_id));
            }

            sqlx::query("DELETE FROM rooms WHERE id = $1")
                .bind(room_id)
                .execute(&self.pool)
                .await?;
            Ok(())
        })
        .await
    }

    async fn delete_room_unchecked(&self, room_id: Uuid) -> Result<(), RoomError> {
        self.bounded(async {
            sqlx::query("DELETE FROM rooms WHERE id = $1")
                .bind(room_id)
                .execute(&self.pool)
                .await?;
            Ok(())
        })
        .await
    }

    async fn save_room_state(&self, room_id: Uuid, whiteboard_state: &[Line]) -> Result<Room, RoomError> {
        self.bounded(async {
            let row = sqlx::query_as::<_, RoomRow>(
                "UPDATE rooms SET whiteboard_state = $2 WHERE id = $1
                 RETURNING id, name, creator_id, whiteboard_state",
            )
            .bind(room_id)
            .bind(Json(whiteboard_state))
            .fetch_optional(&self.pool)
            .await?;

            row.map(row_to_room).ok_or(RoomError::NotFound(room_id))
        })
        .await
    }
}

#[cfg(test)]
#[path = "room_test.rs"]
mod tests;
