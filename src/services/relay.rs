//! Session relay — inbound event dispatch.
//!
//! DESIGN
//! ======
//! One function per connection concern: parse, dispatch, disconnect. Drawing,
//! undo/redo, and clear are stateless relays (sender-excluded broadcast, no
//! registry mutation); join and leave go through the session manager, which
//! owns the membership and teardown policy; save-state is the one event that
//! touches persistence.
//!
//! ERROR HANDLING
//! ==============
//! A message that fails to parse is a protocol violation: logged and dropped,
//! no mutation, no broadcast. A failed save is logged and dropped — the
//! protocol has no error channel back to the client, and in-memory state must
//! not be affected.

use tracing::warn;
use uuid::Uuid;

use crate::event::{ClientEvent, ServerEvent};
use crate::state::AppState;

/// Parse and dispatch one inbound text message.
pub async fn handle_text(state: &AppState, session_id: Uuid, text: &str) {
    match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => handle_event(state, session_id, event).await,
        Err(e) => warn!(%session_id, error = %e, "dropping malformed client event"),
    }
}

/// Dispatch one inbound event on behalf of a session.
pub async fn handle_event(state: &AppState, session_id: Uuid, event: ClientEvent) {
    match event {
        ClientEvent::JoinRoom { room_id } => {
            state.sessions.join_room(room_id, session_id).await;
        }
        ClientEvent::LeaveRoom { room_id } => {
            state.sessions.leave_room(room_id, session_id).await;
        }
        ClientEvent::DrawingData { room_id, line } => {
            state
                .sessions
                .broadcast(room_id, &ServerEvent::ReceiveDrawing { line }, Some(session_id))
                .await;
        }
        ClientEvent::UndoRedo { room_id, state: board } => {
            state
                .sessions
                .broadcast(room_id, &ServerEvent::UndoRedoReceive { state: board }, Some(session_id))
                .await;
        }
        ClientEvent::ClearBoard { room_id } => {
            state
                .sessions
                .broadcast(room_id, &ServerEvent::ClearBoardReceive, Some(session_id))
                .await;
        }
        ClientEvent::SaveState { room_id, whiteboard_state } => {
            if let Err(e) = state.store.save_room_state(room_id, &whiteboard_state).await {
                warn!(error = %e, %room_id, "save-state failed");
            }
        }
    }
}

/// Transport-level disconnect: unwind every membership the session held.
pub async fn handle_disconnect(state: &AppState, session_id: Uuid) {
    state.sessions.disconnect(session_id).await;
}

#[cfg(test)]
#[path = "relay_test.rs"]
mod tests;
