//! Mock data source for testing.
//!
//! `MockSource` implements `DataSource` over in-memory records, paging them
//! the way the analytics API does so tests can run without network calls.
//!
//! # Usage
//!
//! ```rust
//! use board_ingestion::{DataSource, MockSource};
//! use board_types::{BoardRequest, Record};
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let records = vec![Record::try_from(json!({"id": 1})).unwrap()];
//! let mock = MockSource::new().with_records("/holdings", records);
//!
//! let page = mock.fetch_page("/holdings", &BoardRequest::new(1, 10)).await.unwrap();
//! assert_eq!(page.data.len(), 1);
//! assert!(page.pagination.is_last_page);
//! # }
//! ```

use crate::{error::IngestionError, DataSource};
use board_types::{BoardRequest, BoardResponse, PaginationInfo, Record};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock data source for testing.
///
/// Uses builder pattern for convenient setup. Clones share the request log,
/// so a clone handed to a server can still be inspected by the test.
#[derive(Debug, Default, Clone)]
pub struct MockSource {
    /// Records served per endpoint, in upstream order.
    pub boards: HashMap<String, Vec<Record>>,

    /// Records of the previous page repeated at the start of every later
    /// page, imitating an upstream whose pages overlap.
    pub overlap: usize,

    /// Pages that fail with a network error.
    pub failing_pages: HashSet<usize>,

    /// Delay applied before answering any page.
    pub delay: Option<Duration>,

    /// Per-page delays, overriding `delay`.
    pub page_delays: HashMap<usize, Duration>,

    requests: Arc<Mutex<Vec<(String, BoardRequest)>>>,
}

impl MockSource {
    /// Create a new empty mock source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the records served for an endpoint (builder pattern).
    pub fn with_records(mut self, endpoint: impl Into<String>, records: Vec<Record>) -> Self {
        self.boards.insert(endpoint.into(), records);
        self
    }

    /// Repeat `overlap` records of the previous page on each later page.
    pub fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = overlap;
        self
    }

    /// Make `page` fail with a network error.
    pub fn with_failing_page(mut self, page: usize) -> Self {
        self.failing_pages.insert(page);
        self
    }

    /// Delay every response.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Delay responses for one page.
    pub fn with_page_delay(mut self, page: usize, delay: Duration) -> Self {
        self.page_delays.insert(page, delay);
        self
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<(String, BoardRequest)> {
        self.requests
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|log| log.len()).unwrap_or_default()
    }

    fn page_of(&self, records: &[Record], page: usize, per_page: usize) -> BoardResponse {
        let start = ((page - 1) * per_page).min(records.len());
        let end = (start + per_page).min(records.len());
        let from = if page > 1 {
            start.saturating_sub(self.overlap)
        } else {
            start
        };

        BoardResponse {
            data: records[from..end].to_vec(),
            pagination: PaginationInfo {
                page,
                per_page,
                is_last_page: end >= records.len(),
            },
        }
    }
}

impl DataSource for MockSource {
    async fn fetch_page(
        &self,
        endpoint: &str,
        request: &BoardRequest,
    ) -> Result<BoardResponse, IngestionError> {
        let page = request.pagination.page;
        let per_page = request.pagination.per_page;

        if let Ok(mut log) = self.requests.lock() {
            log.push((endpoint.to_string(), request.clone()));
        }

        if let Some(delay) = self.page_delays.get(&page).copied().or(self.delay) {
            tokio::time::sleep(delay).await;
        }

        if page == 0 || per_page == 0 {
            return Err(IngestionError::InvalidInput(format!(
                "page and per_page must be positive, got {}/{}",
                page, per_page
            )));
        }
        if self.failing_pages.contains(&page) {
            return Err(IngestionError::Network(format!(
                "mock failure for {} page {}",
                endpoint, page
            )));
        }

        let records = self
            .boards
            .get(endpoint)
            .ok_or_else(|| IngestionError::NoData(format!("mock endpoint {} not configured", endpoint)))?;

        Ok(self.page_of(records, page, per_page))
    }
}
