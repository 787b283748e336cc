use tabi_core::usage::WallThresholds;

use crate::auth::jwt::JwtConfig;

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
    /// Bound on post-shutdown cleanup in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Usage count at which the login nudge appears (default: `5`).
    pub soft_wall_at: i32,
    /// Daily usage count at which further searches are blocked
    /// (default: `500`; effectively a per-day abuse cap).
    pub hard_wall_at: i32,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    /// | `SOFT_WALL_AT`         | `5`                        |
    /// | `HARD_WALL_AT`         | `500`                      |
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

        let soft_wall_at: i32 = std::env::var("SOFT_WALL_AT")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("SOFT_WALL_AT must be a valid i32");

        let hard_wall_at: i32 = std::env::var("HARD_WALL_AT")
            .unwrap_or_else(|_| "500".into())
            .parse()
            .expect("HARD_WALL_AT must be a valid i32");

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            soft_wall_at,
            hard_wall_at,
            jwt,
        }
    }

    /// Wall thresholds as the domain type.
    ///
    /// # Panics
    ///
    /// Panics when `SOFT_WALL_AT` exceeds `HARD_WALL_AT` -- a
    /// misconfiguration that should fail fast at startup.
    pub fn wall_thresholds(&self) -> WallThresholds {
        WallThresholds::new(self.soft_wall_at, self.hard_wall_at)
            .expect("SOFT_WALL_AT must not exceed HARD_WALL_AT")
    }
}
