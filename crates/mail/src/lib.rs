//! Outbound mail for YaMDb.
//!
//! [`Mailer`] is the seam the API depends on. [`SmtpMailer`] sends through
//! `lettre` when `SMTP_HOST` is configured, [`LogMailer`] writes messages to
//! the log otherwise, and [`MemoryMailer`] records them for tests.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

mod smtp;

pub use smtp::{EmailConfig, EmailError, SmtpMailer};

/// A plain-text message handed to a [`Mailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Delivers plain-text mail to a single recipient.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError>;
}

/// Pick the transport from the environment: SMTP when `SMTP_HOST` is set
/// and usable, the log otherwise.
pub fn mailer_from_env() -> Arc<dyn Mailer> {
    let Some(config) = EmailConfig::from_env() else {
        tracing::info!("SMTP_HOST not set, mail will be written to the log");
        return Arc::new(LogMailer);
    };

    match SmtpMailer::new(&config) {
        Ok(mailer) => {
            tracing::info!(host = %config.smtp_host, port = config.smtp_port, "SMTP mail enabled");
            Arc::new(mailer)
        }
        Err(e) => {
            tracing::error!(error = %e, "SMTP configuration rejected, mail will be written to the log");
            Arc::new(LogMailer)
        }
    }
}

// ---------------------------------------------------------------------------
// LogMailer
// ---------------------------------------------------------------------------

/// Writes each message to the log instead of sending it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        tracing::info!(to, subject, body, "Mail (log transport)");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryMailer
// ---------------------------------------------------------------------------

/// Keeps every message in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryMailer {
    sent: Arc<Mutex<Vec<OutgoingMail>>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages sent so far, oldest first.
    pub async fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().await.clone()
    }

    /// The most recent message sent to `to`.
    pub async fn last_to(&self, to: &str) -> Option<OutgoingMail> {
        self.sent
            .lock()
            .await
            .iter()
            .rev()
            .find(|m| m.to == to)
            .cloned()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        self.sent.lock().await.push(OutgoingMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
