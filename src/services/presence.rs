//! Presence registry — in-memory room → members index.
//!
//! DESIGN
//! ======
//! Pure data structure; every operation is total over unknown ids (an unknown
//! room or session is treated as empty). A reverse session → rooms index is
//! kept in lockstep so disconnect handling can snapshot a session's
//! memberships before unwinding them.
//!
//! A room entry is only ever present-but-empty during the deletion grace
//! window: `leave` keeps the drained entry so the cleanup timer can observe
//! it, and `remove` drops it when the timer fires.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

/// Room → connected sessions, with a reverse index for disconnects.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    rooms: HashMap<Uuid, HashSet<Uuid>>,
    sessions: HashMap<Uuid, HashSet<Uuid>>,
}

impl PresenceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session to a room, creating the member set if absent.
    /// Idempotent. Returns the new member count.
    pub fn join(&mut self, room_id: Uuid, session_id: Uuid) -> usize {
        let members = self.rooms.entry(room_id).or_default();
        members.insert(session_id);
        self.sessions.entry(session_id).or_default().insert(room_id);
        members.len()
    }

    /// Remove a session from a room. Returns the new member count, or `None`
    /// if the room entry no longer exists.
    pub fn leave(&mut self, room_id: Uuid, session_id: Uuid) -> Option<usize> {
        if let Some(rooms) = self.sessions.get_mut(&session_id) {
            rooms.remove(&room_id);
            if rooms.is_empty() {
                self.sessions.remove(&session_id);
            }
        }

        let members = self.rooms.get_mut(&room_id)?;
        members.remove(&session_id);
        Some(members.len())
    }

    /// Current member count; 0 for unknown rooms.
    #[must_use]
    pub fn members_of(&self, room_id: Uuid) -> usize {
        self.rooms.get(&room_id).map_or(0, HashSet::len)
    }

    /// Snapshot of the member session ids for broadcast.
    #[must_use]
    pub fn member_ids(&self, room_id: Uuid) -> Vec<Uuid> {
        self.rooms
            .get(&room_id)
            .map_or_else(Vec::new, |members| members.iter().copied().collect())
    }

    /// Snapshot of every room a session belongs to.
    #[must_use]
    pub fn memberships_of(&self, session_id: Uuid) -> Vec<Uuid> {
        self.sessions
            .get(&session_id)
            .map_or_else(Vec::new, |rooms| rooms.iter().copied().collect())
    }

    /// Drop a room entry entirely. No-op for unknown rooms.
    pub fn remove(&mut self, room_id: Uuid) {
        if let Some(members) = self.rooms.remove(&room_id) {
            for session_id in members {
                if let Some(rooms) = self.sessions.get_mut(&session_id) {
                    rooms.remove(&room_id);
                    if rooms.is_empty() {
                        self.sessions.remove(&session_id);
                    }
                }
            }
        }
    }

    /// Whether the registry holds an entry for the room, even an empty one.
    #[must_use]
    pub fn contains(&self, room_id: Uuid) -> bool {
        self.rooms.contains_key(&room_id)
    }
}

#[cfg(test)]
#[path = "presence_test.rs"]
mod tests;
