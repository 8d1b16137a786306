//! Error types for the ingestion layer.
//!
//! External errors (reqwest, serde_json, url) are converted into owned
//! strings right away so the enum stays free of generics and boxing.

use thiserror::Error;

/// Errors that can occur during data ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestionError {
    /// Network/HTTP errors, including non-success status codes.
    #[error("network error: {0}")]
    Network(String),

    /// The upstream body could not be decoded as a board response.
    #[error("decode error: {0}")]
    Decode(String),

    /// Configuration errors (e.g., malformed env vars).
    #[error("config error: {0}")]
    Config(String),

    /// No data available (e.g., mock endpoint not configured).
    #[error("no data: {0}")]
    NoData(String),

    /// Invalid input (e.g., bad endpoint path).
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<reqwest::Error> for IngestionError {
    #[inline]
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            IngestionError::Decode(err.to_string())
        } else {
            IngestionError::Network(err.to_string())
        }
    }
}

impl From<url::ParseError> for IngestionError {
    #[inline]
    fn from(err: url::ParseError) -> Self {
        IngestionError::InvalidInput(err.to_string())
    }
}
