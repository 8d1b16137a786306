//! Error types for the pipeline.

use thiserror::Error;

/// Errors that can occur while processing a query.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Non-positive page or page size.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A caller-supplied predicate or group key failed on a record.
    #[error("predicate `{name}` failed on record {index}: {source}")]
    Predicate {
        /// Name of the failing filter or group key.
        name: String,
        /// Index of the record in the input slice.
        index: usize,
        /// The predicate's own error.
        source: PredicateError,
    },

    /// The query cannot be expressed as an upstream request.
    #[error("not representable upstream: {0}")]
    NotRepresentable(String),
}

/// Error raised by a caller-supplied predicate or group key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PredicateError {
    /// Human-readable reason.
    pub message: String,
}

impl PredicateError {
    /// Create a predicate error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
