// ================================================================
// File: streamwatch-common/src/error.rs
// ================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Not found error: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A transient platform-API failure (network, timeout, 5xx). The affected
    /// batch is retried on the next cycle.
    #[error("Platform error: {0}")]
    Platform(String),

    /// Token issuance/refresh failed; the cycle is aborted before any
    /// downstream call.
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Parse error: {0}")]
    Parse(String),

    /// Send/edit/delete against the delivery target failed for reasons other
    /// than the message being gone.
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// The delivery target no longer has the referenced message. The
    /// synchronizer branches on this to re-send and persist a fresh handle.
    #[error("Message not found at delivery target")]
    MessageNotFound,

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Uuid error: {0}")]
    Uuid(#[from] uuid::Error),
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Parse(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Parse(s.to_string())
    }
}

impl From<chrono::format::ParseError> for Error {
    fn from(err: chrono::format::ParseError) -> Self {
        Error::Parse(err.to_string())
    }
}
