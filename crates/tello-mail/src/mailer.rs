use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::MailError;
use crate::message::Email;

/// Factory for mail connections (SMTP relay, log outbox, ...).
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Stable label used in logs (`"tellos"`, `"tryouts"`).
    fn name(&self) -> &str;

    /// Open a connection to the transport.
    ///
    /// The caller owns the connection and must [`close`](MailConnection::close)
    /// it once its batch is done, whatever the outcome of the sends.
    async fn connect(&self) -> Result<Box<dyn MailConnection>, MailError>;
}

/// An open connection, reused for every message of one batch.
#[async_trait]
pub trait MailConnection: Send {
    /// Hand one message to the transport. `Ok` means accepted, nothing more.
    async fn send(&mut self, email: &Email) -> Result<(), MailError>;

    async fn close(&mut self) -> Result<(), MailError>;
}

/// Result of one send attempt; failures are values, not errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SendOutcome {
    pub sent: bool,
    pub error: Option<String>,
}

impl SendOutcome {
    pub fn sent() -> Self {
        Self {
            sent: true,
            error: None,
        }
    }

    pub fn failed(error: impl ToString) -> Self {
        Self {
            sent: false,
            error: Some(error.to_string()),
        }
    }
}

/// Send over an already open connection, logging the outcome.
pub async fn deliver(conn: &mut dyn MailConnection, email: &Email) -> SendOutcome {
    match conn.send(email).await {
        Ok(()) => {
            info!(to = %email.recipients(), subject = %email.subject, "email sent");
            SendOutcome::sent()
        }
        Err(e) => {
            warn!(
                to = %email.recipients(),
                subject = %email.subject,
                error = %e,
                "email send failed"
            );
            SendOutcome::failed(e)
        }
    }
}

/// Open a connection, send one message and close it again.
pub async fn send_once(mailer: &dyn Mailer, email: &Email) -> SendOutcome {
    let mut conn = match mailer.connect().await {
        Ok(conn) => conn,
        Err(e) => {
            warn!(mailer = mailer.name(), error = %e, "could not open mail connection");
            return SendOutcome::failed(e);
        }
    };
    let outcome = deliver(conn.as_mut(), email).await;
    if let Err(e) = conn.close().await {
        warn!(mailer = mailer.name(), error = %e, "closing mail connection failed");
    }
    outcome
}
