use super::*;
use crate::event::Point;

#[test]
fn room_serde_preserves_stroke_order() {
    let room = Room {
        id: Uuid::new_v4(),
        name: "demo".into(),
        creator_id: "creator-1".into(),
        whiteboard_state: vec![
            Line { points: vec![Point { x: 1.0, y: 1.0 }] },
            Line { points: vec![Point { x: 2.0, y: 2.0 }] },
            Line { points: vec![Point { x: 3.0, y: 3.0 }] },
        ],
    };

    let json = serde_json::to_string(&room).expect("serialize");
    let restored: Room = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(restored.id, room.id);
    assert_eq!(restored.whiteboard_state, room.whiteboard_state);
}

#[test]
fn room_with_empty_state_round_trips() {
    let room = Room {
        id: Uuid::new_v4(),
        name: "empty".into(),
        creator_id: "anonymous".into(),
        whiteboard_state: Vec::new(),
    };
    let json = serde_json::to_value(&room).expect("serialize");
    assert_eq!(json["whiteboard_state"], serde_json::json!([]));
}

#[test]
fn not_found_names_the_room() {
    let id = Uuid::nil();
    let err = RoomError::NotFound(id);
    assert!(err.to_string().contains(&id.to_string()));
}

#[test]
fn forbidden_mentions_the_creator_check() {
    let err = RoomError::Forbidden(Uuid::nil());
    assert!(err.to_string().contains("creator"));
}
