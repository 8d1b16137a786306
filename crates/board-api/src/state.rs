//! Application state for the API server.

use crate::boards::{BoardDefinition, BoardRegistry};
use crate::error::ApiError;
use board_ingestion::{fetch_pages, DataSource, Latest, DEFAULT_FANOUT_PAGES};
use board_types::{BoardRequest, Record};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Result of refreshing a local board's snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshOutcome {
    /// Board name.
    pub board: String,
    /// Unique records fetched.
    pub records: usize,
    /// Generation of this refresh.
    pub generation: u64,
    /// False when a newer refresh started before this one finished and the
    /// result was discarded.
    pub published: bool,
    /// False when the fan-out ran out of pages before the upstream's last
    /// page; totals computed from this snapshot are then understated.
    pub complete: bool,
}

/// Shared application state.
pub struct AppState<S> {
    /// Upstream data source.
    pub source: S,

    /// Known boards.
    pub registry: BoardRegistry,

    /// Pages fetched concurrently per snapshot.
    pub fanout_pages: usize,

    /// One snapshot slot per local board.
    snapshots: HashMap<String, Latest<Vec<Record>>>,
}

impl<S: DataSource> AppState<S> {
    /// Create state for `registry`, with an empty snapshot per local board.
    pub fn new(source: S, registry: BoardRegistry) -> Self {
        let snapshots = registry
            .list()
            .filter(|board| board.is_local())
            .map(|board| (board.name.clone(), Latest::new()))
            .collect();

        Self {
            source,
            registry,
            fanout_pages: DEFAULT_FANOUT_PAGES,
            snapshots,
        }
    }

    /// Set the fan-out page count (builder pattern).
    pub fn with_fanout_pages(mut self, pages: usize) -> Self {
        self.fanout_pages = pages;
        self
    }

    /// Look up a board or fail with 404.
    pub fn board(&self, name: &str) -> Result<&BoardDefinition, ApiError> {
        self.registry
            .get(name)
            .ok_or_else(|| ApiError::NotFound(format!("unknown board: {}", name)))
    }

    fn slot(&self, board: &BoardDefinition) -> Result<&Latest<Vec<Record>>, ApiError> {
        self.snapshots.get(&board.name).ok_or_else(|| {
            ApiError::BadRequest(format!("board {} is not processed locally", board.name))
        })
    }

    /// Fetch a fresh snapshot for a local board.
    ///
    /// The result is only published if no other refresh of the same board
    /// began while this one was in flight.
    pub async fn refresh(&self, board: &BoardDefinition) -> Result<RefreshOutcome, ApiError> {
        let slot = self.slot(board)?;
        let (outcome, _) = self.load(board, slot).await?;
        Ok(outcome)
    }

    /// Current snapshot of a local board, fetching it on first use.
    ///
    /// When concurrent first fetches race, the loser's records are still
    /// returned to its caller if the winner has not published yet.
    pub async fn snapshot(&self, board: &BoardDefinition) -> Result<Arc<Vec<Record>>, ApiError> {
        let slot = self.slot(board)?;
        if let Some(records) = slot.get().await {
            return Ok(records);
        }

        let (outcome, records) = self.load(board, slot).await?;
        if outcome.published {
            return Ok(records);
        }
        Ok(slot.get().await.unwrap_or(records))
    }

    async fn load(
        &self,
        board: &BoardDefinition,
        slot: &Latest<Vec<Record>>,
    ) -> Result<(RefreshOutcome, Arc<Vec<Record>>), ApiError> {
        let ticket = slot.begin();

        let mut request = BoardRequest::new(1, board.upstream_per_page);
        if let Some(sort) = &board.default_sort {
            request = request.with_sort(sort.clone());
        }

        let fetched = fetch_pages(
            &self.source,
            &board.endpoint,
            &request,
            self.fanout_pages,
            &board.id_field,
        )
        .await?;
        let count = fetched.len();
        let complete = fetched.complete;
        let records = Arc::new(fetched.records);
        let published = slot.publish_shared(ticket, Arc::clone(&records)).await;

        tracing::info!(
            "Refreshed {} snapshot: {} records (generation {}, published: {}, complete: {})",
            board.name,
            count,
            ticket.value(),
            published,
            complete
        );

        let outcome = RefreshOutcome {
            board: board.name.clone(),
            records: count,
            generation: ticket.value(),
            published,
            complete,
        };
        Ok((outcome, records))
    }

    /// Returns true if a local board has a snapshot.
    pub async fn has_snapshot(&self, name: &str) -> bool {
        match self.snapshots.get(name) {
            Some(slot) => !slot.is_empty().await,
            None => false,
        }
    }
}
