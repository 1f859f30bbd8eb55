use super::*;
use std::time::Duration;

fn later(secs: u64) -> Instant {
    Instant::now() + Duration::from_secs(secs)
}

// =============================================================================
// arm / disarm
// =============================================================================

#[test]
fn arm_registers_pending_deletion() {
    let mut scheduler = CleanupScheduler::new();
    let room = Uuid::new_v4();
    assert!(!scheduler.is_armed(room));

    scheduler.arm(room, later(300));
    assert!(scheduler.is_armed(room));
    assert!(scheduler.fire_at(room).is_some());
}

#[test]
fn rearm_replaces_older_timer() {
    let mut scheduler = CleanupScheduler::new();
    let room = Uuid::new_v4();

    let first = scheduler.arm(room, later(300));
    let second = scheduler.arm(room, later(600));
    assert_ne!(first, second);

    // The superseded generation lost its right to fire.
    assert!(!scheduler.take_if_armed(room, first));
    assert!(scheduler.is_armed(room));
    assert!(scheduler.take_if_armed(room, second));
}

#[test]
fn disarm_clears_pending_deletion() {
    let mut scheduler = CleanupScheduler::new();
    let room = Uuid::new_v4();
    let generation = scheduler.arm(room, later(300));

    scheduler.disarm(room);
    assert!(!scheduler.is_armed(room));
    assert!(!scheduler.take_if_armed(room, generation));
}

#[test]
fn disarm_without_timer_is_noop() {
    let mut scheduler = CleanupScheduler::new();
    scheduler.disarm(Uuid::new_v4());
}

// =============================================================================
// take_if_armed
// =============================================================================

#[test]
fn take_if_armed_fires_at_most_once() {
    let mut scheduler = CleanupScheduler::new();
    let room = Uuid::new_v4();
    let generation = scheduler.arm(room, later(300));

    assert!(scheduler.take_if_armed(room, generation));
    assert!(!scheduler.take_if_armed(room, generation));
    assert!(!scheduler.is_armed(room));
}

#[test]
fn take_if_armed_ignores_unknown_room() {
    let mut scheduler = CleanupScheduler::new();
    assert!(!scheduler.take_if_armed(Uuid::new_v4(), 1));
}

#[test]
fn timers_for_different_rooms_are_independent() {
    let mut scheduler = CleanupScheduler::new();
    let r1 = Uuid::new_v4();
    let r2 = Uuid::new_v4();
    let g1 = scheduler.arm(r1, later(300));
    let g2 = scheduler.arm(r2, later(300));

    scheduler.disarm(r1);
    assert!(!scheduler.take_if_armed(r1, g1));
    assert!(scheduler.take_if_armed(r2, g2));
}

// =============================================================================
// attach / disarm_all
// =============================================================================

#[tokio::test]
async fn attach_to_superseded_generation_aborts_task() {
    let mut scheduler = CleanupScheduler::new();
    let room = Uuid::new_v4();

    let stale = scheduler.arm(room, later(300));
    scheduler.arm(room, later(600));

    let task = tokio::spawn(async {
        tokio::time::sleep(Duration::from_secs(3600)).await;
    });
    scheduler.attach(room, stale, task);

    // Current timer is untouched; the stale sleeper was aborted.
    assert!(scheduler.is_armed(room));
}

#[tokio::test]
async fn disarm_all_clears_every_room() {
    let mut scheduler = CleanupScheduler::new();
    let rooms: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
    for room in &rooms {
        let generation = scheduler.arm(*room, later(300));
        let task = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        });
        scheduler.attach(*room, generation, task);
    }

    scheduler.disarm_all();
    for room in &rooms {
        assert!(!scheduler.is_armed(*room));
    }
}
