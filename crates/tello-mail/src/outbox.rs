use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::info;

use crate::error::MailError;
use crate::mailer::{MailConnection, Mailer};
use crate::message::Email;

#[derive(Default)]
struct OutboxState {
    sent: Mutex<Vec<Email>>,
    rejected: Mutex<Vec<String>>,
    opened: AtomicUsize,
    closed: AtomicUsize,
}

fn guard<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// `backend = "log"`: messages are logged and kept in memory.
///
/// Lets the gateway run locally without SMTP credentials, and doubles as the
/// transport in tests (recipient rejection and connection refusal can be
/// switched on).
pub struct OutboxMailer {
    label: String,
    state: Arc<OutboxState>,
    refuse: AtomicBool,
}

impl OutboxMailer {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            state: Arc::new(OutboxState::default()),
            refuse: AtomicBool::new(false),
        }
    }

    /// Every message accepted so far, oldest first.
    pub fn sent(&self) -> Vec<Email> {
        guard(&self.state.sent).clone()
    }

    /// Reject any message addressed to `recipient`.
    pub fn fail_for(&self, recipient: &str) {
        guard(&self.state.rejected).push(recipient.to_string());
    }

    /// Make `connect` fail.
    pub fn refuse_connections(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }

    /// Number of connections opened.
    pub fn opened(&self) -> usize {
        self.state.opened.load(Ordering::SeqCst)
    }

    /// Number of connections closed.
    pub fn closed(&self) -> usize {
        self.state.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Mailer for OutboxMailer {
    fn name(&self) -> &str {
        &self.label
    }

    async fn connect(&self) -> Result<Box<dyn MailConnection>, MailError> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err(MailError::Smtp("connection refused".to_string()));
        }
        self.state.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(OutboxConnection {
            label: self.label.clone(),
            state: Arc::clone(&self.state),
            open: true,
        }))
    }
}

struct OutboxConnection {
    label: String,
    state: Arc<OutboxState>,
    open: bool,
}

#[async_trait]
impl MailConnection for OutboxConnection {
    async fn send(&mut self, email: &Email) -> Result<(), MailError> {
        if !self.open {
            return Err(MailError::Closed);
        }
        if let Some(bad) = email
            .to
            .iter()
            .find(|to| guard(&self.state.rejected).contains(to))
        {
            return Err(MailError::Smtp(format!("recipient rejected: {bad}")));
        }
        info!(
            mailer = %self.label,
            to = %email.recipients(),
            subject = %email.subject,
            attachments = email.attachments.len(),
            "email captured by outbox"
        );
        guard(&self.state.sent).push(email.clone());
        Ok(())
    }

    async fn close(&mut self) -> Result<(), MailError> {
        if self.open {
            self.open = false;
            self.state.closed.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}
