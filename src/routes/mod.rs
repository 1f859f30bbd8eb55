//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the room CRUD endpoints and the websocket upgrade under a single
//! Axum router, with CORS restricted to the configured caller.

pub mod rooms;
pub mod ws;

use axum::Router;
use axum::http::{HeaderValue, StatusCode};
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::state::AppState;

#[must_use]
pub fn app(state: AppState, cors_origin: Option<&str>) -> Router {
    let cors = match cors_origin.map(str::parse::<HeaderValue>) {
        Some(Ok(origin)) => CorsLayer::new().allow_origin(origin).allow_methods(Any).allow_headers(Any),
        Some(Err(e)) => {
            warn!(error = %e, "invalid CORS_ORIGIN; allowing any origin");
            CorsLayer::permissive()
        }
        None => CorsLayer::permissive(),
    };

    Router::new()
        .route("/api/rooms", post(rooms::create_room))
        .route("/api/rooms/{id}", get(rooms::get_room).delete(rooms::delete_room))
        .route("/api/rooms/{id}/state", put(rooms::save_room_state))
        .route("/ws", get(ws::handle_ws))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
