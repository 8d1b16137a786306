//! board-pipeline: filter, sort, paginate and group board records.
//!
//! Every board in the dashboard shows the same kind of list: records pulled
//! from the analytics API, narrowed by a few filters, sorted on one column,
//! cut into pages and optionally grouped. This crate does that once, for any
//! record shape.
//!
//! # Overview
//!
//! - [`Filter`] builds predicates: inclusive ranges, label membership,
//!   case-insensitive search, plus `any`/`negate`/`custom` combinators.
//! - [`GroupKey`] assigns records to groups (by field, by Sunday-start week,
//!   or a custom key).
//! - [`Query`] bundles filters, sort keys, grouping and the page window into
//!   one immutable value, and converts to and from the upstream
//!   [`BoardRequest`] payload.
//! - [`process`] runs the query and returns a [`PipelineResult`].
//!
//! # Example
//!
//! ```rust
//! use board_pipeline::{process, Filter, Query, Record};
//! use serde_json::json;
//!
//! let records: Vec<Record> = (0..25)
//!     .map(|i| {
//!         let chain = if i % 2 == 0 { "ethereum" } else { "solana" };
//!         Record::try_from(json!({"id": i, "chain": chain})).unwrap()
//!     })
//!     .collect();
//!
//! let query = Query::new().filter(Filter::membership("chain", ["ethereum"]));
//! let result = process(&records, &query).unwrap();
//!
//! assert_eq!(result.total_count, 13);
//! assert_eq!(result.total_pages, 2);
//! assert_eq!(result.page_len(), 10);
//! ```

mod error;
mod filter;
mod group;
mod pipeline;
mod query;
mod sort;

pub use error::{PipelineError, PredicateError};
pub use filter::{Filter, PredicateFn};
pub use group::{
    parse_record_date, week_label, week_start, GroupAssignment, GroupKey, GroupKeyFn, LabelFormat,
    UNKNOWN_LABEL, UNKNOWN_WEEK_LABEL,
};
pub use pipeline::{process, Group, PipelineResult};
pub use query::{Query, DEFAULT_GROUP_LABEL};
pub use sort::{compare_by, compare_records};

// Re-export the record and wire types so callers need only this crate.
pub use board_types::{
    BoardRequest, BoardResponse, FilterValue, Record, SortDirection, SortSpec, Value,
};
