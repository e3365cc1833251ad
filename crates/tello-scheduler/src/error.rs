use tello_core::TelloError;
use tello_mail::MailError;
use tello_store::StoreError;
use thiserror::Error;

/// Errors that abort a whole job run.
///
/// Per-booking problems (a field that no longer exists, a rejected
/// recipient) are not errors; they end up in the run report.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("mail error: {0}")]
    Mail(#[from] MailError),

    #[error(transparent)]
    Core(#[from] TelloError),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
