//! Board registry.
//!
//! A board is one dashboard table backed by one upstream endpoint. Boards
//! whose endpoint supports filtering, sorting and pagination are served in
//! [`ProcessingMode::Server`]: the query is forwarded as-is. The others are
//! served in [`ProcessingMode::Local`]: a few pages are fetched up front and
//! the pipeline runs in memory over that snapshot.

use board_types::SortSpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Upstream page size used when filling a local snapshot.
pub const DEFAULT_UPSTREAM_PER_PAGE: usize = 100;

/// Where filtering, sorting and pagination happen for a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingMode {
    /// The upstream API does the work.
    Server,
    /// Fetch a snapshot, then process in memory.
    Local,
}

/// Static description of a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardDefinition {
    /// URL-safe board name.
    pub name: String,

    /// Upstream endpoint path.
    pub endpoint: String,

    /// Field identifying a record, used to drop duplicates across pages.
    pub id_field: String,

    /// Sort applied when a query does not specify one.
    pub default_sort: Option<SortSpec>,

    /// Processing mode.
    pub mode: ProcessingMode,

    /// Page size for snapshot fetches.
    pub upstream_per_page: usize,
}

impl BoardDefinition {
    /// A board processed by the upstream API.
    pub fn server(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            id_field: "id".to_string(),
            default_sort: None,
            mode: ProcessingMode::Server,
            upstream_per_page: DEFAULT_UPSTREAM_PER_PAGE,
        }
    }

    /// A board processed locally over a de-duplicated snapshot.
    pub fn local(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        id_field: impl Into<String>,
    ) -> Self {
        Self {
            id_field: id_field.into(),
            mode: ProcessingMode::Local,
            ..Self::server(name, endpoint)
        }
    }

    /// Set the default sort (builder pattern).
    pub fn with_default_sort(mut self, sort: SortSpec) -> Self {
        self.default_sort = Some(sort);
        self
    }

    /// Set the snapshot page size (builder pattern).
    pub fn with_upstream_per_page(mut self, per_page: usize) -> Self {
        self.upstream_per_page = per_page;
        self
    }

    /// Returns true if queries run in memory.
    #[inline]
    pub fn is_local(&self) -> bool {
        self.mode == ProcessingMode::Local
    }
}

/// Boards by name.
#[derive(Debug, Clone, Default)]
pub struct BoardRegistry {
    boards: BTreeMap<String, BoardDefinition>,
}

impl BoardRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The boards of the smart-money dashboard.
    pub fn builtin() -> Self {
        Self::new()
            .with_board(
                BoardDefinition::server("holdings", "/api/v1/smart-money/holdings")
                    .with_default_sort(SortSpec::desc("value_usd")),
            )
            .with_board(
                BoardDefinition::server("netflows", "/api/v1/smart-money/netflow")
                    .with_default_sort(SortSpec::desc("net_flow_24h_usd")),
            )
            .with_board(
                BoardDefinition::server("token-screener", "/api/v1/token-screener")
                    .with_default_sort(SortSpec::desc("buy_volume")),
            )
            .with_board(
                BoardDefinition::server("pnl-leaderboard", "/api/v1/tgm/pnl-leaderboard")
                    .with_default_sort(SortSpec::desc("pnl_usd_realised")),
            )
            .with_board(
                BoardDefinition::local(
                    "dex-trades",
                    "/api/v1/smart-money/dex-trades",
                    "transaction_hash",
                )
                .with_default_sort(SortSpec::desc("block_timestamp")),
            )
            .with_board(
                BoardDefinition::local(
                    "perp-trades",
                    "/api/v1/smart-money/perp-trades",
                    "transaction_hash",
                )
                .with_default_sort(SortSpec::desc("block_timestamp")),
            )
            .with_board(
                BoardDefinition::local("dcas", "/api/v1/smart-money/dcas", "dca_id")
                    .with_default_sort(SortSpec::desc("since_timestamp")),
            )
            .with_board(
                BoardDefinition::local("kol-performance", "/api/v1/kol/performance", "address")
                    .with_default_sort(SortSpec::desc("pnl_usd")),
            )
    }

    /// Add or replace a board (builder pattern).
    pub fn with_board(mut self, board: BoardDefinition) -> Self {
        self.boards.insert(board.name.clone(), board);
        self
    }

    /// Look up a board by name.
    pub fn get(&self, name: &str) -> Option<&BoardDefinition> {
        self.boards.get(name)
    }

    /// All boards, ordered by name.
    pub fn list(&self) -> impl Iterator<Item = &BoardDefinition> {
        self.boards.values()
    }

    /// Number of boards.
    pub fn len(&self) -> usize {
        self.boards.len()
    }

    /// Returns true if no boards are registered.
    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_boards() {
        let registry = BoardRegistry::builtin();
        assert_eq!(registry.len(), 8);

        let holdings = registry.get("holdings").unwrap();
        assert_eq!(holdings.mode, ProcessingMode::Server);
        assert_eq!(holdings.default_sort, Some(SortSpec::desc("value_usd")));

        let trades = registry.get("dex-trades").unwrap();
        assert!(trades.is_local());
        assert_eq!(trades.id_field, "transaction_hash");
        assert_eq!(trades.upstream_per_page, DEFAULT_UPSTREAM_PER_PAGE);

        assert!(registry.get("whale-alerts").is_none());
    }

    #[test]
    fn test_list_is_sorted_by_name() {
        let registry = BoardRegistry::builtin();
        let names: Vec<&str> = registry
            .list()
            .map(|b| b.name.as_str())
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_with_board_replaces() {
        let registry = BoardRegistry::new()
            .with_board(BoardDefinition::server("x", "/a"))
            .with_board(BoardDefinition::local("x", "/b", "id"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("x").unwrap().endpoint, "/b");
    }

    #[test]
    fn test_mode_serialization() {
        assert_eq!(
            serde_json::to_string(&ProcessingMode::Local).unwrap(),
            "\"local\""
        );
    }
}
