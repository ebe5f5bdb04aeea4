//! Error types shared by scheduling, storage and import/export.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SrsError {
    /// Rating outside again/hard/good/easy
    #[error("Invalid rating: {0:?} (expected again, hard, good, easy or 1-4)")]
    InvalidRating(String),

    /// Stored record violates a scheduling invariant
    #[error("Malformed review record for '{identity}': {reason}")]
    MalformedRecord { identity: String, reason: String },

    /// Record handed to an operation keyed by a different item
    #[error("Record identity mismatch: expected '{expected}', found '{found}'")]
    IdentityMismatch { expected: String, found: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SrsError {
    pub(crate) fn malformed(identity: &str, reason: impl Into<String>) -> Self {
        SrsError::MalformedRecord {
            identity: identity.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SrsError>;
