use super::*;
use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc::Receiver;

use crate::event::{Line, Point};
use crate::services::room::RoomStore;
use crate::state::test_helpers::{connect_session, failing_app_state, seed_room, test_app_state};

const GRACE: Duration = Duration::from_secs(300);

fn one_point_line() -> Line {
    Line { points: vec![Point { x: 1.0, y: 1.0 }] }
}

fn next_event(rx: &mut Receiver<ServerEvent>) -> ServerEvent {
    rx.try_recv().expect("expected a queued event")
}

fn assert_no_event(rx: &mut Receiver<ServerEvent>) {
    assert!(rx.try_recv().is_err(), "expected no queued event");
}

fn drain(rx: &mut Receiver<ServerEvent>) {
    while rx.try_recv().is_ok() {}
}

// =============================================================================
// STATELESS RELAYS
// =============================================================================

#[tokio::test]
async fn drawing_reaches_every_peer_but_never_the_sender() {
    let (state, _store) = test_app_state(GRACE);
    let room = Uuid::new_v4();
    let (a, mut rx_a) = connect_session(&state).await;
    let (b, mut rx_b) = connect_session(&state).await;
    let (c, mut rx_c) = connect_session(&state).await;
    for session in [a, b, c] {
        handle_event(&state, session, ClientEvent::JoinRoom { room_id: room }).await;
    }
    drain(&mut rx_a);
    drain(&mut rx_b);
    drain(&mut rx_c);

    let line = one_point_line();
    handle_event(&state, a, ClientEvent::DrawingData { room_id: room, line: line.clone() }).await;

    for rx in [&mut rx_b, &mut rx_c] {
        let ServerEvent::ReceiveDrawing { line: received } = next_event(rx) else {
            panic!("expected receive-drawing");
        };
        assert_eq!(received, line);
    }
    assert_no_event(&mut rx_a);
}

#[tokio::test]
async fn drawing_alone_in_a_room_reaches_nobody() {
    let (state, _store) = test_app_state(GRACE);
    let room = Uuid::new_v4();
    let (a, mut rx_a) = connect_session(&state).await;
    handle_event(&state, a, ClientEvent::JoinRoom { room_id: room }).await;
    drain(&mut rx_a);

    handle_event(&state, a, ClientEvent::DrawingData { room_id: room, line: one_point_line() }).await;

    assert_no_event(&mut rx_a);
}

#[tokio::test]
async fn undo_redo_relays_state_to_peers_only() {
    let (state, _store) = test_app_state(GRACE);
    let room = Uuid::new_v4();
    let (a, mut rx_a) = connect_session(&state).await;
    let (b, mut rx_b) = connect_session(&state).await;
    handle_event(&state, a, ClientEvent::JoinRoom { room_id: room }).await;
    handle_event(&state, b, ClientEvent::JoinRoom { room_id: room }).await;
    drain(&mut rx_a);
    drain(&mut rx_b);

    let board = vec![one_point_line()];
    handle_event(&state, a, ClientEvent::UndoRedo { room_id: room, state: board.clone() }).await;

    assert_eq!(next_event(&mut rx_b), ServerEvent::UndoRedoReceive { state: board });
    assert_no_event(&mut rx_a);
}

#[tokio::test]
async fn clear_board_relays_signal_to_peers_only() {
    let (state, _store) = test_app_state(GRACE);
    let room = Uuid::new_v4();
    let (a, mut rx_a) = connect_session(&state).await;
    let (b, mut rx_b) = connect_session(&state).await;
    handle_event(&state, a, ClientEvent::JoinRoom { room_id: room }).await;
    handle_event(&state, b, ClientEvent::JoinRoom { room_id: room }).await;
    drain(&mut rx_a);
    drain(&mut rx_b);

    handle_event(&state, b, ClientEvent::ClearBoard { room_id: room }).await;

    assert_eq!(next_event(&mut rx_a), ServerEvent::ClearBoardReceive);
    assert_no_event(&mut rx_b);
}

// =============================================================================
// SAVE-STATE
// =============================================================================

#[tokio::test]
async fn save_state_persists_through_the_store() {
    let (state, store) = test_app_state(GRACE);
    let (a, _rx_a) = connect_session(&state).await;
    let room = seed_room(&store, "creator-1").await;

    let board = vec![one_point_line(), Line { points: vec![Point { x: 2.0, y: 3.0 }] }];
    handle_event(&state, a, ClientEvent::SaveState { room_id: room, whiteboard_state: board.clone() }).await;

    let saved = store.get_room(room).await.expect("room should exist");
    assert_eq!(saved.whiteboard_state, board);
}

#[tokio::test]
async fn save_state_failure_leaves_membership_intact() {
    let state = failing_app_state(GRACE);
    let room = Uuid::new_v4();
    let (a, _rx_a) = connect_session(&state).await;
    handle_event(&state, a, ClientEvent::JoinRoom { room_id: room }).await;

    handle_event(&state, a, ClientEvent::SaveState { room_id: room, whiteboard_state: vec![] }).await;

    assert_eq!(state.sessions.members_of(room).await, 1);
}

// =============================================================================
// PROTOCOL VIOLATIONS
// =============================================================================

#[tokio::test]
async fn invalid_json_is_dropped_without_effect() {
    let (state, _store) = test_app_state(GRACE);
    let room = Uuid::new_v4();
    let (a, mut rx_a) = connect_session(&state).await;
    handle_event(&state, a, ClientEvent::JoinRoom { room_id: room }).await;
    drain(&mut rx_a);

    handle_text(&state, a, "{not json").await;

    assert_eq!(state.sessions.members_of(room).await, 1);
    assert_no_event(&mut rx_a);
}

#[tokio::test]
async fn event_without_room_id_is_dropped() {
    let (state, _store) = test_app_state(GRACE);
    let (a, mut rx_a) = connect_session(&state).await;

    let text = json!({"event": "join-room", "data": {}}).to_string();
    handle_text(&state, a, &text).await;

    assert_no_event(&mut rx_a);
}

#[tokio::test]
async fn well_formed_text_joins_through_the_relay() {
    let (state, _store) = test_app_state(GRACE);
    let room = Uuid::new_v4();
    let (a, mut rx_a) = connect_session(&state).await;

    let text = json!({"event": "join-room", "data": {"room_id": room}}).to_string();
    handle_text(&state, a, &text).await;

    assert_eq!(next_event(&mut rx_a), ServerEvent::ActiveUsers { count: 1 });
}

// =============================================================================
// FULL SESSION SCENARIOS
// =============================================================================

#[tokio::test(start_paused = true)]
async fn churn_scenario_room_survives_rejoin_within_grace() {
    let (state, store) = test_app_state(GRACE);
    let room = seed_room(&store, "creator-1").await;
    let (a, mut rx_a) = connect_session(&state).await;
    let (b, mut rx_b) = connect_session(&state).await;

    // A joins: count 1 to A.
    handle_event(&state, a, ClientEvent::JoinRoom { room_id: room }).await;
    assert_eq!(next_event(&mut rx_a), ServerEvent::ActiveUsers { count: 1 });

    // B joins: count 2 to both.
    handle_event(&state, b, ClientEvent::JoinRoom { room_id: room }).await;
    assert_eq!(next_event(&mut rx_a), ServerEvent::ActiveUsers { count: 2 });
    assert_eq!(next_event(&mut rx_b), ServerEvent::ActiveUsers { count: 2 });

    // A disconnects ungracefully: count 1 to B.
    handle_disconnect(&state, a).await;
    assert_eq!(next_event(&mut rx_b), ServerEvent::ActiveUsers { count: 1 });

    // B leaves: room drains, deletion scheduled.
    handle_event(&state, b, ClientEvent::LeaveRoom { room_id: room }).await;
    assert!(state.sessions.deletion_pending(room).await);

    // B rejoins inside the grace window: deletion cancelled, room persists.
    tokio::time::sleep(GRACE / 2).await;
    handle_event(&state, b, ClientEvent::JoinRoom { room_id: room }).await;
    assert!(!state.sessions.deletion_pending(room).await);

    tokio::time::sleep(GRACE * 2).await;
    tokio::task::yield_now().await;
    assert!(store.contains(room).await, "room must survive a rejoin within grace");
}

#[tokio::test(start_paused = true)]
async fn abandoned_room_scenario_ends_in_deletion() {
    let (state, store) = test_app_state(GRACE);
    let room = seed_room(&store, "creator-1").await;
    let (a, _rx_a) = connect_session(&state).await;

    handle_event(&state, a, ClientEvent::JoinRoom { room_id: room }).await;
    handle_event(&state, a, ClientEvent::DrawingData { room_id: room, line: one_point_line() }).await;
    handle_disconnect(&state, a).await;

    tokio::time::sleep(GRACE + Duration::from_millis(50)).await;
    tokio::task::yield_now().await;

    assert!(!store.contains(room).await);
    assert!(!state.sessions.has_presence_entry(room).await);
}
