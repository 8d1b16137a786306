//! API error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use board_ingestion::IngestionError;
use board_pipeline::PipelineError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API errors that can be returned to clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    BadRequest(String),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// Error from the upstream analytics API.
    #[error("upstream error: {0}")]
    Upstream(#[from] IngestionError),

    /// Error from the list-processing pipeline.
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable details, if safe to expose.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// HTTP status and error code for this error.
    pub fn status(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            ApiError::Upstream(IngestionError::InvalidInput(_)) => {
                (StatusCode::BAD_REQUEST, "bad_request")
            }
            ApiError::Upstream(IngestionError::Config(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
            ApiError::Upstream(_) => (StatusCode::BAD_GATEWAY, "upstream_error"),
            ApiError::Pipeline(PipelineError::Predicate { .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "pipeline_error")
            }
            ApiError::Pipeline(_) => (StatusCode::BAD_REQUEST, "invalid_query"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = self.status();

        let details = match &self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) => Some(msg.clone()),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                None
            }
            ApiError::Upstream(e) => {
                tracing::error!("Upstream error: {}", e);
                Some(e.to_string())
            }
            ApiError::Pipeline(e) => {
                if status.is_server_error() {
                    tracing::error!("Pipeline error: {}", e);
                }
                Some(e.to_string())
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
