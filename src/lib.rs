//! sketchroom — collaborative whiteboard room server.
//!
//! Clients join named rooms over a websocket, relay strokes to each other in
//! real time, and persist board state explicitly. Rooms that stay empty for a
//! grace period are deleted automatically; any rejoin inside the window
//! cancels the deletion.

pub mod config;
pub mod db;
pub mod event;
pub mod routes;
pub mod services;
pub mod state;
