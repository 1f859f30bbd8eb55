//! Event — the wire protocol for sketchroom.
//!
//! DESIGN
//! ======
//! Every websocket message is a JSON object `{"event": ..., "data": ...}`.
//! Inbound events always carry the target room id; the session id is implicit
//! in the connection. Outbound events carry only payload — the relay decides
//! the audience (inclusive or sender-excluded room broadcast).
//!
//! Malformed inbound messages are protocol violations: the relay drops them
//! without mutation or broadcast, so deserialization failure is the only
//! validation layer this protocol needs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// DRAWING TYPES
// =============================================================================

/// A single point on the board, in client canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// One stroke. Replay order of lines matters, so whiteboard state is always
/// an ordered sequence of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub points: Vec<Point>,
}

// =============================================================================
// INBOUND
// =============================================================================

/// Client → server events.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    JoinRoom { room_id: Uuid },
    LeaveRoom { room_id: Uuid },
    DrawingData { room_id: Uuid, line: Line },
    SaveState { room_id: Uuid, whiteboard_state: Vec<Line> },
    UndoRedo { room_id: Uuid, state: Vec<Line> },
    ClearBoard { room_id: Uuid },
}

// =============================================================================
// OUTBOUND
// =============================================================================

/// Server → room members events.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Current member count. Inclusive broadcast.
    ActiveUsers { count: usize },
    /// A stroke from a peer. Sender-excluded.
    ReceiveDrawing { line: Line },
    /// Full board state after an undo/redo. Sender-excluded.
    UndoRedoReceive { state: Vec<Line> },
    /// Board cleared by a peer. Sender-excluded.
    ClearBoardReceive,
    /// The room was deleted by its creator. Inclusive.
    RoomDeleted { message: String, room_id: Uuid },
}

// =============================================================================
// TESTS
// =============================================================================
