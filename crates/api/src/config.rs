use std::fmt::Display;
use std::str::FromStr;

use crate::auth::jwt::JwtConfig;

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Front-end origins allowed by CORS.
    pub cors_origins: Vec<String>,
    /// Requests running longer than this are answered with 408.
    pub request_timeout_secs: u64,
    /// How long shutdown waits for the database pool to drain.
    pub shutdown_timeout_secs: u64,
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load from the environment (and `.env`, if the caller ran dotenvy).
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `3000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                    |
    /// | `DATABASE_URL`          | required                |
    /// | `DB_MAX_CONNECTIONS`    | `20`                    |
    ///
    /// JWT settings are documented on [`JwtConfig::from_env`].
    ///
    /// # Panics
    ///
    /// If `DATABASE_URL` is unset or a numeric variable does not parse.
    pub fn from_env() -> Self {
        let Ok(database_url) = std::env::var("DATABASE_URL") else {
            panic!("DATABASE_URL must be set");
        };

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("PORT", 3000),
            cors_origins: parse_origins(
                &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
            ),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 30),
            database_url,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 20),
            jwt: JwtConfig::from_env(),
        }
    }
}

/// Parse `key` if set, otherwise `default`. Panics on a malformed value.
fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key}={raw:?} is invalid: {e}")),
        Err(_) => default,
    }
}

/// Split a comma-separated origin list, dropping blanks.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}
