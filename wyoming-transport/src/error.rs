//! Transport error types

use thiserror::Error;

/// Errors that can occur while binding, accepting or framing events
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Invalid URI: {0} (expected unix://PATH or tcp://HOST:PORT)")]
    InvalidUri(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid event JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid event header: {0}")]
    InvalidHeader(String),
}
