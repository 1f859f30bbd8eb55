//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the room store and the room session manager — the one instance that
//! owns all in-memory presence and cleanup state. Both are constructed at
//! server start; there are no ambient singletons.

use std::sync::Arc;
use std::time::Duration;

use crate::services::room::RoomStore;
use crate::services::session::RoomSessionManager;

/// Shared application state. Clone is required by Axum — all inner fields
/// are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RoomStore>,
    pub sessions: Arc<RoomSessionManager>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn RoomStore>, grace_period: Duration) -> Self {
        let sessions = RoomSessionManager::new(Arc::clone(&store), grace_period);
        Self { store, sessions }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
