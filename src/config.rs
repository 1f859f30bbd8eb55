//! Environment-driven configuration.
//!
//! DESIGN
//! ======
//! Everything tunable is an environment variable with a default, parsed once
//! at startup. `DATABASE_URL` is the only required setting; an unreachable
//! database is the one startup failure that aborts the process.

use std::time::Duration;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_GRACE_PERIOD_SECS: u64 = 5 * 60;
const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;

/// Runtime configuration, loaded from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string.
    pub database_url: String,
    /// TCP port for the HTTP + websocket listener.
    pub port: u16,
    /// Allowed cross-origin caller. `None` means any origin.
    pub cors_origin: Option<String>,
    /// How long an empty room survives before automatic deletion.
    pub grace_period: Duration,
    /// Upper bound on a single persistence call.
    pub store_timeout: Duration,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is unset.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL required".to_string())?;
        Ok(Self {
            database_url,
            port: env_parse("PORT", DEFAULT_PORT),
            cors_origin: std::env::var("CORS_ORIGIN").ok(),
            grace_period: Duration::from_secs(env_parse("ROOM_GRACE_PERIOD_SECS", DEFAULT_GRACE_PERIOD_SECS)),
            store_timeout: Duration::from_secs(env_parse("STORE_TIMEOUT_SECS", DEFAULT_STORE_TIMEOUT_SECS)),
        })
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
