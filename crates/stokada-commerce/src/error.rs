//! Commerce error types.

use thiserror::Error;

/// Errors that can occur in catalog and pricing operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// A catalog record could not be parsed at all.
    #[error("Malformed catalog record: {0}")]
    MalformedRecord(String),

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::SerializationError(e.to_string())
    }
}
