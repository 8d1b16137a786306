//! board-types: Shared data structures for the analytics boards.
//!
//! This crate defines the types shared across the workspace:
//! - [`Record`] - A schema-less row returned by the upstream analytics API
//! - [`SortSpec`] / [`SortDirection`] - The sort vocabulary used both locally and upstream
//! - [`BoardRequest`] / [`BoardResponse`] - The upstream request and response payloads
//!
//! # Example
//!
//! ```rust
//! use board_types::{Record, SortSpec};
//! use serde_json::json;
//!
//! let record = Record::try_from(json!({
//!     "chain": "ethereum",
//!     "value_usd": 1500.0,
//! }))
//! .unwrap();
//!
//! assert_eq!(record.number("value_usd"), 1500.0);
//! assert_eq!(record.number("market_cap_usd"), 0.0); // missing fields resolve to zero
//! assert_eq!(record.key("chain").as_deref(), Some("ethereum"));
//!
//! let sort = SortSpec::desc("value_usd");
//! assert_eq!(sort.direction.as_str(), "DESC");
//! ```

mod error;
mod record;
mod sort;
mod wire;

pub use error::TypeError;
pub use record::{numeric_value, value_key, Record};
pub use sort::{SortDirection, SortSpec};
pub use wire::{
    BoardRequest, BoardResponse, FilterValue, PaginationInfo, PaginationRequest, RangeBounds,
    SearchSpec, DEFAULT_PAGE, DEFAULT_PER_PAGE,
};

// Re-export the JSON value type so downstream crates can build records
// without adding serde_json as a direct dependency.
pub use serde_json::Value;
