use thiserror::Error;

/// Errors returned by any repository implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The HTTP request never produced a response (DNS, TLS, connection reset).
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-2xx status.
    #[error("store returned {status}: {message}")]
    Api { status: u16, message: String },

    /// A row could not be decoded into the expected record type.
    #[error("could not decode {table} rows: {reason}")]
    Decode { table: String, reason: String },

    /// An insert returned no representation.
    #[error("insert into {table} returned no row")]
    EmptyInsert { table: String },

    /// Write rejected by the in-memory store (test hook).
    #[error("write rejected: {0}")]
    Rejected(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
