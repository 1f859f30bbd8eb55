//! Cleanup scheduler — deferred, cancellable room-deletion timers.
//!
//! DESIGN
//! ======
//! One `PendingDeletion` per room id, keyed by lookup rather than closure
//! identity. Arming returns a generation number; the sleeping task carries it
//! and must present it back at fire time. A cancel or re-arm bumps the room
//! out of the map (and aborts the sleeper), so a fire that raced a cancel
//! fails the generation check and becomes a benign no-op. At-most-once firing
//! falls out of `take_if_armed` removing the entry on the first match.
//!
//! The scheduler only bookkeeps; the session manager owns the membership
//! re-check and the actual deletion.

use std::collections::HashMap;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

/// An armed one-shot deletion timer for a room.
#[derive(Debug)]
pub struct PendingDeletion {
    generation: u64,
    fire_at: Instant,
    task: Option<JoinHandle<()>>,
}

/// Room id → armed deletion timer.
#[derive(Debug, Default)]
pub struct CleanupScheduler {
    pending: HashMap<Uuid, PendingDeletion>,
    next_generation: u64,
}

impl CleanupScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a deletion timer for a room, replacing (and aborting) any timer
    /// already armed for it. Returns the generation the sleeper must present
    /// at fire time.
    pub fn arm(&mut self, room_id: Uuid, fire_at: Instant) -> u64 {
        self.next_generation += 1;
        let generation = self.next_generation;
        if let Some(old) = self
            .pending
            .insert(room_id, PendingDeletion { generation, fire_at, task: None })
        {
            if let Some(task) = old.task {
                task.abort();
            }
        }
        generation
    }

    /// Attach the spawned sleeper to its armed entry so a later disarm can
    /// abort it. Ignored if the entry was already superseded.
    pub fn attach(&mut self, room_id: Uuid, generation: u64, task: JoinHandle<()>) {
        match self.pending.get_mut(&room_id) {
            Some(entry) if entry.generation == generation => entry.task = Some(task),
            _ => task.abort(),
        }
    }

    /// Disarm the timer for a room. No-op if none armed.
    pub fn disarm(&mut self, room_id: Uuid) {
        if let Some(entry) = self.pending.remove(&room_id) {
            if let Some(task) = entry.task {
                task.abort();
            }
        }
    }

    /// Consume the armed entry if it still matches `generation`. Returns
    /// whether the caller won the right to fire. A mismatch means the timer
    /// was cancelled or superseded while the sleeper was waking up.
    pub fn take_if_armed(&mut self, room_id: Uuid, generation: u64) -> bool {
        match self.pending.get(&room_id) {
            Some(entry) if entry.generation == generation => {
                self.pending.remove(&room_id);
                true
            }
            _ => false,
        }
    }

    /// Whether a deletion is currently armed for the room.
    #[must_use]
    pub fn is_armed(&self, room_id: Uuid) -> bool {
        self.pending.contains_key(&room_id)
    }

    /// When the armed timer for a room will fire, if any.
    #[must_use]
    pub fn fire_at(&self, room_id: Uuid) -> Option<Instant> {
        self.pending.get(&room_id).map(|entry| entry.fire_at)
    }

    /// Disarm everything. Used at shutdown.
    pub fn disarm_all(&mut self) {
        for (_, entry) in self.pending.drain() {
            if let Some(task) = entry.task {
                task.abort();
            }
        }
    }
}

#[cfg(test)]
#[path = "cleanup_test.rs"]
mod tests;
