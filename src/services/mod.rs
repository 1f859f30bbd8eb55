//! Domain services used by websocket and HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the real-time membership lifecycle and persistence
//! concerns so route handlers can stay focused on transport plumbing.

pub mod cleanup;
pub mod presence;
pub mod relay;
pub mod room;
pub mod session;
