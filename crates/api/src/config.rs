use crate::auth::jwt::JwtConfig;

/// Default lock wait for the per-slot booking lock, in milliseconds.
pub const DEFAULT_BOOKING_LOCK_TIMEOUT_MS: u64 = 5000;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound on post-shutdown cleanup in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// How long a booking transaction waits for the slot lock before the
    /// request fails with a slot conflict (default: `5000`).
    pub booking_lock_timeout_ms: u64,
    /// Seed the default slot catalog at boot (default: `true`).
    pub seed_catalog: bool,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                    |
    /// |---------------------------|----------------------------|
    /// | `HOST`                    | `0.0.0.0`                  |
    /// | `PORT`                    | `3000`                     |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`   | `30`                       |
    /// | `BOOKING_LOCK_TIMEOUT_MS` | `5000`                     |
    /// | `SEED_CATALOG`            | `true`                     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let booking_lock_timeout_ms: u64 = std::env::var("BOOKING_LOCK_TIMEOUT_MS")
            .unwrap_or_else(|_| DEFAULT_BOOKING_LOCK_TIMEOUT_MS.to_string())
            .parse()
            .expect("BOOKING_LOCK_TIMEOUT_MS must be a valid u64");

        let seed_catalog: bool = std::env::var("SEED_CATALOG")
            .unwrap_or_else(|_| "true".into())
            .parse()
            .expect("SEED_CATALOG must be true or false");

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            booking_lock_timeout_ms,
            seed_catalog,
            jwt,
        }
    }
}
