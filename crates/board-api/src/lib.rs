//! board-api: HTTP API layer for the board service.
//!
//! This crate defines the REST API endpoints:
//! - `GET /health`
//! - `GET /v1/boards`
//! - `POST /v1/boards/:board/query`
//! - `POST /v1/boards/:board/refresh`
//!
//! Query bodies use the upstream request shape (`filters`, `sortBy`,
//! `pagination`) plus an optional `group_by`.
//!
//! # Example
//!
//! ```rust,no_run
//! use board_api::{create_router, AppState, BoardRegistry};
//! use board_ingestion::{AnalyticsClient, ApiConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AnalyticsClient::new(ApiConfig::from_env()?);
//!     let state = Arc::new(AppState::new(client, BoardRegistry::builtin()));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, create_router(state)).await?;
//!     Ok(())
//! }
//! ```

mod boards;
mod error;
mod handlers;
mod state;
mod types;

pub use boards::{BoardDefinition, BoardRegistry, ProcessingMode, DEFAULT_UPSTREAM_PER_PAGE};
pub use error::{ApiError, ErrorResponse};
pub use state::{AppState, RefreshOutcome};
pub use types::{
    BoardListResponse, BoardQueryRequest, BoardQueryResponse, GroupResponse, GroupSpec,
    HealthResponse, PageResponse,
};

use axum::{
    routing::{get, post},
    Router,
};
use board_ingestion::DataSource;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the router with every endpoint, request tracing and permissive CORS.
pub fn create_router<S: DataSource + 'static>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/v1/boards", get(handlers::list_boards::<S>))
        .route("/v1/boards/:board/query", post(handlers::query_board::<S>))
        .route("/v1/boards/:board/refresh", post(handlers::refresh_board::<S>))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
