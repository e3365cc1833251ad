use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment as LettreAttachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::PoolConfig;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tello_core::config::{MailProfile, SmtpSecurity};
use tracing::debug;

use crate::error::MailError;
use crate::mailer::{MailConnection, Mailer};
use crate::message::Email;

type Transport = AsyncSmtpTransport<Tokio1Executor>;

/// `backend = "smtp"`: delivery through an SMTP relay.
pub struct SmtpMailer {
    label: String,
    profile: MailProfile,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(label: impl Into<String>, profile: &MailProfile) -> Result<Self, MailError> {
        if profile.host.trim().is_empty() {
            return Err(MailError::MissingConfig("mail host".to_string()));
        }
        let from = parse_mailbox(&profile.from)?;
        Ok(Self {
            label: label.into(),
            profile: profile.clone(),
            from,
        })
    }

    fn transport(&self) -> Result<Transport, MailError> {
        let host = self.profile.host.as_str();
        let builder = match self.profile.security {
            SmtpSecurity::Starttls => Transport::starttls_relay(host)
                .map_err(|e| MailError::Smtp(e.to_string()))?,
            SmtpSecurity::Tls => {
                Transport::relay(host).map_err(|e| MailError::Smtp(e.to_string()))?
            }
            SmtpSecurity::None => Transport::builder_dangerous(host),
        };

        let mut builder = builder
            .port(self.profile.port)
            // one connection per batch
            .pool_config(PoolConfig::new().max_size(1));

        if let (Some(user), Some(pass)) = (&self.profile.username, &self.profile.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }
        Ok(builder.build())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    fn name(&self) -> &str {
        &self.label
    }

    async fn connect(&self) -> Result<Box<dyn MailConnection>, MailError> {
        let transport = self.transport()?;
        let ok = transport
            .test_connection()
            .await
            .map_err(|e| MailError::Smtp(e.to_string()))?;
        if !ok {
            return Err(MailError::Smtp(format!(
                "{} did not accept the connection",
                self.profile.host
            )));
        }
        debug!(mailer = %self.label, host = %self.profile.host, "SMTP connection open");
        Ok(Box::new(SmtpConnection {
            transport: Some(transport),
            from: self.from.clone(),
        }))
    }
}

struct SmtpConnection {
    transport: Option<Transport>,
    from: Mailbox,
}

#[async_trait]
impl MailConnection for SmtpConnection {
    async fn send(&mut self, email: &Email) -> Result<(), MailError> {
        let transport = self.transport.as_ref().ok_or(MailError::Closed)?;
        let message = build_message(&self.from, email)?;
        transport
            .send(message)
            .await
            .map_err(|e| MailError::Smtp(e.to_string()))?;
        Ok(())
    }

    /// Sends QUIT on the pooled connection and waits for it to close.
    async fn close(&mut self) -> Result<(), MailError> {
        if let Some(transport) = self.transport.take() {
            transport.shutdown().await;
            debug!("SMTP connection closed");
        }
        Ok(())
    }
}

fn parse_mailbox(raw: &str) -> Result<Mailbox, MailError> {
    raw.parse::<Mailbox>()
        .map_err(|_| MailError::InvalidAddress(raw.to_string()))
}

/// Assemble the MIME message: text (+ HTML alternative) (+ attachments).
pub(crate) fn build_message(from: &Mailbox, email: &Email) -> Result<Message, MailError> {
    if email.to.is_empty() {
        return Err(MailError::Build("no recipients".to_string()));
    }

    let mut builder = Message::builder().from(from.clone()).subject(&email.subject);
    for to in &email.to {
        builder = builder.to(parse_mailbox(to)?);
    }

    let body = match &email.html {
        Some(html) => MultiPart::alternative_plain_html(email.text.clone(), html.clone()),
        None => MultiPart::mixed().singlepart(SinglePart::plain(email.text.clone())),
    };

    let body = if email.attachments.is_empty() {
        body
    } else {
        let mut mixed = MultiPart::mixed().multipart(body);
        for att in &email.attachments {
            let content_type = ContentType::parse(&att.content_type)
                .map_err(|e| MailError::Build(e.to_string()))?;
            mixed = mixed.singlepart(
                LettreAttachment::new(att.filename.clone()).body(att.data.clone(), content_type),
            );
        }
        mixed
    };

    builder
        .multipart(body)
        .map_err(|e| MailError::Build(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Attachment;

    fn from() -> Mailbox {
        "Futbol Tello <info@futboltello.com>".parse().unwrap()
    }

    #[test]
    fn builds_alternative_message() {
        let email = Email::new(vec!["ana@example.com".into()], "Hola", "texto")
            .with_html("<p>html</p>".into());
        let message = build_message(&from(), &email).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("To: ana@example.com"));
    }

    #[test]
    fn attaches_pdf() {
        let email = Email::new(vec!["ops@example.com".into()], "Agenda", "adjunto")
            .with_attachment(Attachment::pdf("agenda.pdf", b"%PDF-1.3".to_vec()));
        let message = build_message(&from(), &email).unwrap();
        let raw = String::from_utf8_lossy(&message.formatted()).to_string();
        assert!(raw.contains("application/pdf"));
        assert!(raw.contains("agenda.pdf"));
    }

    #[test]
    fn rejects_bad_recipient() {
        let email = Email::new(vec!["no-es-un-correo".into()], "x", "y");
        assert!(matches!(
            build_message(&from(), &email),
            Err(MailError::InvalidAddress(_))
        ));
    }

    fn profile(host: &str) -> MailProfile {
        MailProfile {
            backend: tello_core::config::MailBackend::Smtp,
            host: host.into(),
            port: 2525,
            username: None,
            password: None,
            security: SmtpSecurity::None,
            from: "info@futboltello.com".into(),
        }
    }

    #[tokio::test]
    async fn closed_connection_refuses_sends() {
        let mailer = SmtpMailer::new("tellos", &profile("127.0.0.1")).unwrap();
        let mut conn = SmtpConnection {
            transport: Some(mailer.transport().unwrap()),
            from: from(),
        };
        conn.close().await.unwrap();
        assert!(conn.transport.is_none());

        let email = Email::new(vec!["ana@example.com".into()], "Hola", "texto");
        assert!(matches!(conn.send(&email).await, Err(MailError::Closed)));
        // closing twice is harmless
        conn.close().await.unwrap();
    }

    #[test]
    fn smtp_profile_requires_host() {
        let profile = MailProfile {
            backend: tello_core::config::MailBackend::Smtp,
            host: String::new(),
            port: 587,
            username: None,
            password: None,
            security: SmtpSecurity::Starttls,
            from: "info@futboltello.com".into(),
        };
        assert!(matches!(
            SmtpMailer::new("tellos", &profile),
            Err(MailError::MissingConfig(_))
        ));
    }
}
