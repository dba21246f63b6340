use std::sync::Arc;

use yamdb_core::clock::Clock;
use yamdb_core::confirmation::ConfirmationCodes;
use yamdb_mail::Mailer;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: yamdb_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Source of "now" for year validation and confirmation codes.
    pub clock: Arc<dyn Clock>,
    /// Delivers confirmation codes.
    pub mailer: Arc<dyn Mailer>,
    pub codes: Arc<ConfirmationCodes>,
}

impl AppState {
    pub fn new(
        pool: yamdb_db::DbPool,
        config: ServerConfig,
        clock: Arc<dyn Clock>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let codes = ConfirmationCodes::new(
            config.confirmation.secret.clone(),
            config.confirmation.ttl_days,
        );
        Self {
            pool,
            config: Arc::new(config),
            clock,
            mailer,
            codes: Arc::new(codes),
        }
    }
}
