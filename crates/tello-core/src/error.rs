use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelloError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid weekday {0} (expected 0 = Sunday .. 6 = Saturday)")]
    InvalidWeekday(i64),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

pub type Result<T> = std::result::Result<T, TelloError>;
