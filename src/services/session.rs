//! Room session manager — membership lifecycle and teardown policy.
//!
//! ARCHITECTURE
//! ============
//! One injected instance owns the presence registry, the cleanup scheduler,
//! and the per-session outbound senders as private state behind a single
//! mutex. Every membership mutation and its resulting broadcast happen inside
//! one lock hold with no awaits, so inbound events for a room are strictly
//! serialized against the deletion timers for that room. Only genuinely
//! asynchronous work (the timer wait, the store delete) runs outside the
//! critical section.
//!
//! LIFECYCLE
//! =========
//! A room is ACTIVE while it has members. When the last member leaves it
//! starts DRAINING: a deletion timer is armed for the grace period. Any join
//! before the timer fires disarms it. When the timer fires and the re-check
//! still finds no members, the room is GONE: the presence entry is dropped
//! and the persisted document is deleted without a creator check. A fire that
//! loses the race against a join is a no-op.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tokio::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::event::ServerEvent;
use crate::services::cleanup::CleanupScheduler;
use crate::services::presence::PresenceRegistry;
use crate::services::room::RoomStore;

/// Registry, scheduler, and transport senders, guarded together.
struct Inner {
    presence: PresenceRegistry,
    cleanup: CleanupScheduler,
    senders: HashMap<Uuid, mpsc::Sender<ServerEvent>>,
}

pub struct RoomSessionManager {
    store: Arc<dyn RoomStore>,
    grace_period: Duration,
    /// Handle to ourselves for the deletion timer tasks.
    weak_self: Weak<Self>,
    inner: Mutex<Inner>,
}

impl RoomSessionManager {
    #[must_use]
    pub fn new(store: Arc<dyn RoomStore>, grace_period: Duration) -> Arc<Self> {
        Arc::new_cyclic(|weak_self| Self {
            store,
            grace_period,
            weak_self: weak_self.clone(),
            inner: Mutex::new(Inner {
                presence: PresenceRegistry::new(),
                cleanup: CleanupScheduler::new(),
                senders: HashMap::new(),
            }),
        })
    }

    // =========================================================================
    // SESSION LIFECYCLE
    // =========================================================================

    /// Register a connected session's outbound sender.
    pub async fn register(&self, session_id: Uuid, tx: mpsc::Sender<ServerEvent>) {
        let mut inner = self.inner.lock().await;
        inner.senders.insert(session_id, tx);
    }

    /// Unwind an ungracefully disconnected session: apply the leave policy to
    /// every room it was in, then drop its sender. The membership list is
    /// snapshotted before any mutation.
    pub async fn disconnect(&self, session_id: Uuid) {
        let mut inner = self.inner.lock().await;
        inner.senders.remove(&session_id);

        let rooms = inner.presence.memberships_of(session_id);
        for room_id in rooms {
            self.apply_leave(&mut inner, room_id, session_id);
        }
    }

    // =========================================================================
    // JOIN / LEAVE
    // =========================================================================

    /// Join a session to a room: cancel any pending deletion and tell every
    /// member (including the joiner) the new count.
    pub async fn join_room(&self, room_id: Uuid, session_id: Uuid) {
        let mut inner = self.inner.lock().await;
        inner.cleanup.disarm(room_id);
        let count = inner.presence.join(room_id, session_id);
        info!(%room_id, %session_id, count, "session joined room");
        broadcast_locked(&inner, room_id, &ServerEvent::ActiveUsers { count }, None);
    }

    /// Remove a session from a room and apply the teardown policy.
    pub async fn leave_room(&self, room_id: Uuid, session_id: Uuid) {
        let mut inner = self.inner.lock().await;
        self.apply_leave(&mut inner, room_id, session_id);
    }

    /// Shared leave policy: at count zero the room starts draining; otherwise
    /// remaining members get the updated count.
    fn apply_leave(&self, inner: &mut Inner, room_id: Uuid, session_id: Uuid) {
        let Some(count) = inner.presence.leave(room_id, session_id) else {
            return;
        };
        info!(%room_id, %session_id, count, "session left room");

        if count == 0 {
            self.schedule_teardown(inner, room_id);
        } else {
            broadcast_locked(inner, room_id, &ServerEvent::ActiveUsers { count }, None);
        }
    }

    // =========================================================================
    // TEARDOWN
    // =========================================================================

    /// Arm the deletion timer for a drained room. Replaces any older timer.
    fn schedule_teardown(&self, inner: &mut Inner, room_id: Uuid) {
        let Some(manager) = self.weak_self.upgrade() else {
            return;
        };
        let fire_at = Instant::now() + self.grace_period;
        let generation = inner.cleanup.arm(room_id, fire_at);
        info!(%room_id, grace_secs = self.grace_period.as_secs(), "room drained; deletion scheduled");

        let task = tokio::spawn(async move {
            tokio::time::sleep_until(fire_at).await;
            manager.finish_teardown(room_id, generation).await;
        });
        inner.cleanup.attach(room_id, generation, task);
    }

    /// Timer body. Re-checks membership under the lock before deleting
    /// anything; a join that raced the fire wins.
    async fn finish_teardown(&self, room_id: Uuid, generation: u64) {
        {
            let mut inner = self.inner.lock().await;
            if !inner.cleanup.take_if_armed(room_id, generation) {
                return;
            }
            if inner.presence.members_of(room_id) > 0 {
                info!(%room_id, "deletion fired but members rejoined; keeping room");
                return;
            }
            inner.presence.remove(room_id);
        }

        // Store I/O outside the lock. A transient failure leaves the
        // persisted row behind but never touches in-memory state again.
        match self.store.delete_room_unchecked(room_id).await {
            Ok(()) => info!(%room_id, "room deleted after grace period"),
            Err(e) => error!(error = %e, %room_id, "automatic room deletion failed"),
        }
    }

    /// Manual deletion already happened at the store level: notify everyone
    /// still in the room and disarm any pending automatic deletion so it
    /// cannot fire redundantly later. A drained entry is dropped outright,
    /// since with the timer gone nothing else would ever remove it.
    pub async fn room_deleted_by_creator(&self, room_id: Uuid) {
        let mut inner = self.inner.lock().await;
        inner.cleanup.disarm(room_id);
        broadcast_locked(
            &inner,
            room_id,
            &ServerEvent::RoomDeleted { message: "Room has been deleted by the creator".into(), room_id },
            None,
        );
        if inner.presence.members_of(room_id) == 0 {
            inner.presence.remove(room_id);
        }
    }

    /// Cancel every pending deletion timer. Called at shutdown.
    pub async fn shutdown(&self) {
        let mut inner = self.inner.lock().await;
        inner.cleanup.disarm_all();
        info!("cancelled all pending room deletions");
    }

    // =========================================================================
    // BROADCAST
    // =========================================================================

    /// Send an event to every member of a room, optionally excluding one.
    pub async fn broadcast(&self, room_id: Uuid, event: &ServerEvent, exclude: Option<Uuid>) {
        let inner = self.inner.lock().await;
        broadcast_locked(&inner, room_id, event, exclude);
    }

    // =========================================================================
    // TEST VISIBILITY
    // =========================================================================

    #[cfg(test)]
    pub(crate) async fn members_of(&self, room_id: Uuid) -> usize {
        self.inner.lock().await.presence.members_of(room_id)
    }

    #[cfg(test)]
    pub(crate) async fn has_presence_entry(&self, room_id: Uuid) -> bool {
        self.inner.lock().await.presence.contains(room_id)
    }

    #[cfg(test)]
    pub(crate) async fn deletion_pending(&self, room_id: Uuid) -> bool {
        self.inner.lock().await.cleanup.is_armed(room_id)
    }
}

/// Fan an event out to room members over their senders. Best-effort: a full
/// or closed channel skips that member.
fn broadcast_locked(inner: &Inner, room_id: Uuid, event: &ServerEvent, exclude: Option<Uuid>) {
    for session_id in inner.presence.member_ids(room_id) {
        if exclude == Some(session_id) {
            continue;
        }
        let Some(tx) = inner.senders.get(&session_id) else {
            continue;
        };
        if let Err(e) = tx.try_send(event.clone()) {
            warn!(%session_id, %room_id, error = %e, "dropping outbound event for slow session");
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
