//! Error types for board-types.

use thiserror::Error;

/// Errors that can occur when working with types.
#[derive(Debug, Error)]
pub enum TypeError {
    /// A record was built from a JSON value that is not an object.
    #[error("record must be a JSON object, got {0}")]
    NotAnObject(String),

    /// Unknown sort direction string.
    #[error("invalid sort direction: {0}")]
    InvalidDirection(String),
}
