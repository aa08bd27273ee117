//! Error types for shelfsync

use thiserror::Error;

/// Result type alias for shelfsync operations
pub type Result<T> = std::result::Result<T, ShelfsyncError>;

/// Workspace-wide error type
#[derive(Error, Debug)]
pub enum ShelfsyncError {
    #[error("unknown record kind: {0}")]
    UnknownRecordKind(String),

    #[error("attribute '{attribute}' does not hold {expected}")]
    MalformedAttribute {
        attribute: String,
        expected: &'static str,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}
