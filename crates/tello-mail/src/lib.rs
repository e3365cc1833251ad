//! `tello-mail`: outgoing email for both businesses.
//!
//! A [`Mailer`] hands out [`MailConnection`]s. Batch jobs open one
//! connection, send every message over it and close it at the end;
//! interactive endpoints use [`send_once`].
//!
//! | Backend         | Behaviour                                   |
//! |-----------------|---------------------------------------------|
//! | [`SmtpMailer`]  | Delivers through an SMTP relay via lettre   |
//! | [`OutboxMailer`]| Logs and keeps messages in memory           |

pub mod compose;
pub mod error;
pub mod mailer;
pub mod message;
pub mod outbox;
pub mod smtp;

use std::sync::Arc;

use tello_core::config::{MailBackend, MailProfile};

pub use error::MailError;
pub use mailer::{deliver, send_once, MailConnection, Mailer, SendOutcome};
pub use message::{Attachment, Email};
pub use outbox::OutboxMailer;
pub use smtp::SmtpMailer;

/// Build the mailer selected by a config profile.
pub fn build_mailer(label: &str, profile: &MailProfile) -> Result<Arc<dyn Mailer>, MailError> {
    match profile.backend {
        MailBackend::Smtp => Ok(Arc::new(SmtpMailer::new(label, profile)?)),
        MailBackend::Log => Ok(Arc::new(OutboxMailer::new(label))),
    }
}
