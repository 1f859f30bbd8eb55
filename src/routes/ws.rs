//! WebSocket route — transport loop for the session relay.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → mint a session id, register an outbound channel
//! 2. Inbound text → `relay::handle_text` (parse + dispatch)
//! 3. Outbound channel → serialize + send to the socket
//! 4. Close or error → `relay::handle_disconnect` unwinds memberships
//!
//! The socket loop owns no room logic; everything stateful lives behind the
//! session manager so the relay can be tested without a socket.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::event::ServerEvent;
use crate::services::relay;
use crate::state::AppState;

/// Outbound channel depth per session. A session that falls this far behind
/// starts losing broadcasts rather than stalling the room.
const OUTBOUND_BUFFER: usize = 256;

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let session_id = Uuid::new_v4();
    let (tx, mut rx) = mpsc::channel::<ServerEvent>(OUTBOUND_BUFFER);
    state.sessions.register(session_id, tx).await;
    info!(%session_id, "ws: client connected");

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => relay::handle_text(&state, session_id, &text).await,
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            Some(event) = rx.recv() => {
                if send_event(&mut socket, &event).await.is_err() {
                    break;
                }
            }
        }
    }

    relay::handle_disconnect(&state, session_id).await;
    info!(%session_id, "ws: client disconnected");
}

async fn send_event(socket: &mut WebSocket, event: &ServerEvent) -> Result<(), ()> {
    let json = match serde_json::to_string(event) {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, "ws: failed to serialize event");
            return Err(());
        }
    };
    socket.send(Message::Text(json.into())).await.map_err(|_| ())
}
