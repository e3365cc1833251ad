use tello_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgendaError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("PDF rendering failed: {0}")]
    Pdf(String),
}

pub type Result<T> = std::result::Result<T, AgendaError>;
