use std::sync::Arc;

use sketchroom::config::Config;
use sketchroom::services::room::PgRoomStore;
use sketchroom::state::AppState;
use sketchroom::{db, routes};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::from_env().expect("invalid configuration");

    let pool = db::init_pool(&config.database_url)
        .await
        .expect("database init failed");

    let store = Arc::new(PgRoomStore::new(pool, config.store_timeout));
    let state = AppState::new(store, config.grace_period);

    let app = routes::app(state.clone(), config.cors_origin.as_deref());
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = config.port, grace_secs = config.grace_period.as_secs(), "sketchroom listening");
    let sessions = Arc::clone(&state.sessions);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            // Stop armed deletion timers from firing while connections drain.
            sessions.shutdown().await;
        })
        .await
        .expect("server failed");
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
