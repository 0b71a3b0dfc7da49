//! Error types for dropwatch
//!
//! Defines one error enum covering all failure modes across the system.
//! Uses thiserror for ergonomic error handling.
//!
//! Fatal vs. recoverable is decided by the caller, not the variant: the
//! orchestrator absorbs `List` per folder (and `Delivery` under the
//! best-effort policy) while `Config`, `Decode` and `Io` always propagate
//! to the top of the process.

use thiserror::Error;

/// Result type alias for dropwatch operations
pub type Result<T> = std::result::Result<T, DropwatchError>;

/// Comprehensive error type for dropwatch operations
#[derive(Error, Debug)]
pub enum DropwatchError {
    /// Configuration errors (missing credential, identifiers)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persisted store exists but cannot be parsed
    #[error("Store decode error: {0}")]
    Decode(String),

    /// Folder listing failure (transport or auth)
    #[error("Listing error: {0}")]
    List(String),

    /// Webhook rejected or unreachable
    #[error("Delivery error (status {status}): {reason}")]
    Delivery { status: u16, reason: String },

    /// Timestamp parsing errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),

    /// Anyhow errors (for more context)
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

impl From<drive_files::Error> for DropwatchError {
    fn from(e: drive_files::Error) -> Self {
        DropwatchError::List(e.to_string())
    }
}
