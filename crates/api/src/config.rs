//! Environment-driven settings for the API binary.

use std::fmt::Display;
use std::str::FromStr;

use yamdb_core::confirmation::DEFAULT_CODE_TTL_DAYS;

use crate::auth::jwt::JwtConfig;

/// Read `key`, falling back to `default` when unset.
///
/// # Panics
///
/// Panics when the variable is set but does not parse; a misconfigured
/// server should not start.
pub(crate) fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} has an invalid value '{raw}': {e}")),
        Err(_) => default,
    }
}

/// Listener, CORS, timeouts and the nested auth settings.
///
/// | Env Var                 | Default                 |
/// |-------------------------|-------------------------|
/// | `HOST`                  | `0.0.0.0`               |
/// | `PORT`                  | `3000`                  |
/// | `CORS_ORIGINS`          | `http://localhost:5173` |
/// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
/// | `SHUTDOWN_TIMEOUT_SECS` | `30`                    |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Comma-separated in `CORS_ORIGINS`; blanks are dropped.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// Upper bound on draining in-flight requests after a shutdown signal.
    pub shutdown_timeout_secs: u64,
    pub jwt: JwtConfig,
    pub confirmation: ConfirmationConfig,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let cors_origins = env_or("CORS_ORIGINS", "http://localhost:5173".to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        let jwt = JwtConfig::from_env();
        let confirmation = ConfirmationConfig::from_env(&jwt.secret);

        Self {
            host: env_or("HOST", "0.0.0.0".to_string()),
            port: env_or("PORT", 3000),
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 30),
            jwt,
            confirmation,
        }
    }
}

/// Signing key and lifetime of signup confirmation codes.
///
/// | Env Var                      | Default      |
/// |------------------------------|--------------|
/// | `CONFIRMATION_SECRET`        | `JWT_SECRET` |
/// | `CONFIRMATION_CODE_TTL_DAYS` | `3`          |
#[derive(Debug, Clone)]
pub struct ConfirmationConfig {
    pub secret: String,
    pub ttl_days: i64,
}

impl ConfirmationConfig {
    pub fn from_env(jwt_secret: &str) -> Self {
        let secret = std::env::var("CONFIRMATION_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| jwt_secret.to_string());

        Self {
            secret,
            ttl_days: env_or("CONFIRMATION_CODE_TTL_DAYS", DEFAULT_CODE_TTL_DAYS),
        }
    }
}
