//! # board-ingestion
//!
//! Data acquisition layer for the upstream analytics API.
//!
//! This crate provides a [`DataSource`] trait over the board endpoints, a
//! reqwest-backed [`AnalyticsClient`], and a [`MockSource`] for tests. On top
//! of any source it offers page fan-out with de-duplication
//! ([`fetch_pages`], [`fetch_all_pages`]) and a generation counter
//! ([`Generation`], [`Latest`]) for discarding stale responses.
//!
//! ## Design Principles
//!
//! - **Zero-cost async**: Uses native async traits (Rust 1.75+), avoiding
//!   the heap allocations that `async_trait` would require.
//!
//! - **Schema-less**: Every board returns records of a different shape, so
//!   the layer only speaks [`BoardRequest`] and [`BoardResponse`].
//!
//! - **Testable**: [`MockSource`] pages configured records the way the real
//!   API does, including overlapping pages and failures.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use board_ingestion::{AnalyticsClient, ApiConfig, DataSource};
//! use board_types::{BoardRequest, SortSpec};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AnalyticsClient::new(ApiConfig::from_env()?);
//!
//!     let request = BoardRequest::new(1, 25).with_sort(SortSpec::desc("value_usd"));
//!     let response = client
//!         .fetch_page("/api/v1/smart-money/holdings", &request)
//!         .await?;
//!
//!     println!("Fetched {} records", response.data.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Testing with MockSource
//!
//! ```rust
//! use board_ingestion::{fetch_pages, MockSource};
//! use board_types::{BoardRequest, Record};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let records = (0..30)
//!         .map(|i| Record::try_from(json!({"id": i})).unwrap())
//!         .collect();
//!     let mock = MockSource::new().with_records("/trades", records);
//!
//!     let merged = fetch_pages(&mock, "/trades", &BoardRequest::new(1, 10), 5, "id")
//!         .await
//!         .unwrap();
//!     assert_eq!(merged.len(), 30);
//!     assert!(merged.complete);
//! }
//! ```

mod api_client;
pub mod config;
pub mod error;
mod fanout;
mod generation;
mod mock;

pub use api_client::AnalyticsClient;
pub use config::ApiConfig;
pub use error::IngestionError;
pub use fanout::{dedup_by_id, fetch_all_pages, fetch_pages, FetchedPages, DEFAULT_FANOUT_PAGES};
pub use generation::{Generation, GenerationTicket, Latest};
pub use mock::MockSource;

use board_types::{BoardRequest, BoardResponse};

/// Data source abstraction for board endpoints.
///
/// It uses native async syntax (Rust 1.75+) rather than `async_trait`
/// to avoid heap allocations from `Box<dyn Future>`.
///
/// ## Implementors
///
/// - [`AnalyticsClient`]: Production implementation over HTTP
/// - [`MockSource`]: Test implementation with configurable records
///
/// The trait requires `Send + Sync` so a source can sit in an `Arc` shared
/// by every request handler.
pub trait DataSource: Send + Sync {
    /// Fetch one page of a board endpoint.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Path of the board endpoint, e.g. `/api/v1/tgm/dex-trades`
    /// * `request` - Filters, sort and pagination for the upstream
    ///
    /// # Errors
    ///
    /// Returns [`IngestionError::Network`] if the call fails or returns a
    /// non-success status, [`IngestionError::InvalidInput`] for a bad
    /// endpoint, and [`IngestionError::Decode`] for an unexpected body.
    fn fetch_page(
        &self,
        endpoint: &str,
        request: &BoardRequest,
    ) -> impl std::future::Future<Output = Result<BoardResponse, IngestionError>> + Send;
}
