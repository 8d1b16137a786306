//! Multi-page fetching and de-duplication.
//!
//! Boards that are processed locally need more than one upstream page. The
//! upstream does not guarantee disjoint pages (records can shift between
//! requests), so every multi-page fetch ends with [`dedup_by_id`]:
//!
//! - the first occurrence of an id wins, later ones are dropped;
//! - records without an id are always kept;
//! - the relative order of kept records is unchanged.

use crate::{error::IngestionError, DataSource};
use board_types::{BoardRequest, Record};
use futures::future::join_all;
use std::collections::HashSet;

/// Pages fetched concurrently when nothing else is configured.
pub const DEFAULT_FANOUT_PAGES: usize = 5;

/// Records merged from several upstream pages.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedPages {
    /// Unique records in page order.
    pub records: Vec<Record>,
    /// Pages whose records were merged.
    pub pages: usize,
    /// False when the fetch stopped before the upstream reported its last
    /// page, so later records are missing.
    pub complete: bool,
}

impl FetchedPages {
    /// Number of unique records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no records were fetched.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Fetch `pages` consecutive pages concurrently and merge them.
///
/// Pages start at `request.pagination.page` and keep its page size and
/// filters. Results are merged in page order regardless of completion order;
/// pages after one marked `is_last_page` are ignored. Any failing page fails
/// the whole fetch. If no page is marked last the result is incomplete.
pub async fn fetch_pages<S: DataSource>(
    source: &S,
    endpoint: &str,
    request: &BoardRequest,
    pages: usize,
    id_field: &str,
) -> Result<FetchedPages, IngestionError> {
    if pages == 0 {
        return Err(IngestionError::InvalidInput(
            "fan-out needs at least one page".to_string(),
        ));
    }

    let first = request.pagination.page;
    let requests: Vec<BoardRequest> = (first..first + pages)
        .map(|page| request.for_page(page))
        .collect();

    let fetch_futures: Vec<_> = requests
        .iter()
        .map(|page_request| source.fetch_page(endpoint, page_request))
        .collect();

    let results = join_all(fetch_futures).await;

    let mut merged = Vec::new();
    let mut merged_pages = 0;
    let mut complete = false;
    for (page_request, result) in requests.iter().zip(results) {
        let response = result.map_err(|e| {
            tracing::warn!(
                "Fetching {} page {} failed: {}",
                endpoint,
                page_request.pagination.page,
                e
            );
            e
        })?;
        merged_pages += 1;
        let is_last = response.pagination.is_last_page;
        merged.extend(response.data);
        if is_last {
            complete = true;
            break;
        }
    }

    if !complete {
        tracing::warn!(
            "Fan-out over {} stopped after page {} without reaching the last page; snapshot is truncated",
            endpoint,
            first + pages - 1
        );
    }

    let records = dedup_by_id(merged, id_field);
    tracing::info!(
        "Fetched {} unique records from {} ({} pages)",
        records.len(),
        endpoint,
        merged_pages
    );
    Ok(FetchedPages {
        records,
        pages: merged_pages,
        complete,
    })
}

/// Walk pages one at a time until the upstream reports the last page.
///
/// Stops on `is_last_page`, on an empty page, or after `max_pages` pages
/// (logged as a warning since data may be missing).
pub async fn fetch_all_pages<S: DataSource>(
    source: &S,
    endpoint: &str,
    request: &BoardRequest,
    max_pages: usize,
    id_field: &str,
) -> Result<FetchedPages, IngestionError> {
    let mut merged = Vec::new();
    let mut page = request.pagination.page;
    let mut fetched = 0;
    let mut complete = false;

    loop {
        if fetched >= max_pages {
            tracing::warn!(
                "Hit {} page limit for {}; later pages were not fetched",
                max_pages,
                endpoint
            );
            break;
        }

        let response = source.fetch_page(endpoint, &request.for_page(page)).await?;
        fetched += 1;

        if response.data.is_empty() {
            complete = true;
            break;
        }
        let is_last = response.pagination.is_last_page;
        merged.extend(response.data);
        if is_last {
            complete = true;
            break;
        }
        page += 1;
    }

    let records = dedup_by_id(merged, id_field);
    tracing::info!(
        "Fetched {} unique records from {} ({} pages)",
        records.len(),
        endpoint,
        fetched
    );
    Ok(FetchedPages {
        records,
        pages: fetched,
        complete,
    })
}

/// Drop records whose `id_field` was already seen.
pub fn dedup_by_id(records: Vec<Record>, id_field: &str) -> Vec<Record> {
    let total = records.len();
    let mut seen: HashSet<String> = HashSet::new();

    let unique: Vec<Record> = records
        .into_iter()
        .filter(|record| match record.key(id_field) {
            Some(id) => seen.insert(id),
            None => true,
        })
        .collect();

    if unique.len() < total {
        tracing::debug!(
            "Dropped {} duplicate records by {}",
            total - unique.len(),
            id_field
        );
    }
    unique
}
