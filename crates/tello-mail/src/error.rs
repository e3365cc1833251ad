use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("missing required config: {0}")]
    MissingConfig(String),

    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("template rendering failed: {0}")]
    Template(#[from] askama::Error),

    #[error("SMTP error: {0}")]
    Smtp(String),

    /// `send` called after `close`.
    #[error("connection already closed")]
    Closed,
}
