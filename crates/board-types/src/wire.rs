//! Upstream analytics API payloads.
//!
//! Boards that delegate processing to the API send a [`BoardRequest`]:
//!
//! ```text
//! {
//!   "filters":    { "value_usd": {"min": 1000}, "chain": ["ethereum"] },
//!   "sortBy":     [ {"field": "value_usd", "direction": "DESC"} ],
//!   "pagination": { "page": 1, "per_page": 10 }
//! }
//! ```
//!
//! and get back a [`BoardResponse`] with `data` rows and pagination info.

use crate::{Record, SortSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Default page for requests that omit pagination.
pub const DEFAULT_PAGE: usize = 1;

/// Default page size for requests that omit pagination.
pub const DEFAULT_PER_PAGE: usize = 10;

/// Inclusive numeric bounds. Either bound may be omitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RangeBounds {
    /// Lower bound (inclusive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    /// Upper bound (inclusive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// Case-insensitive text search across several fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchSpec {
    /// Fields to search in.
    pub fields: Vec<String>,
    /// Text to look for.
    pub query: String,
}

/// A single filter entry in a request's `filters` object.
///
/// The variant is chosen by shape: an array is a label set, an object with
/// `fields`/`query` is a search, and an object with `min`/`max` is a range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Field value must be one of these.
    AnyOf(Vec<Value>),
    /// Text search.
    Search(SearchSpec),
    /// Numeric range.
    Range(RangeBounds),
}

/// Requested page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationRequest {
    /// 1-indexed page number.
    pub page: usize,
    /// Page size.
    pub per_page: usize,
}

impl Default for PaginationRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// Request body for a board endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardRequest {
    /// Filters keyed by field (or by a search name).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub filters: BTreeMap<String, FilterValue>,

    /// Sort keys, most significant first.
    #[serde(rename = "sortBy", default, skip_serializing_if = "Vec::is_empty")]
    pub sort_by: Vec<SortSpec>,

    /// Page window.
    #[serde(default)]
    pub pagination: PaginationRequest,
}

impl BoardRequest {
    /// Create an unfiltered request for one page.
    pub fn new(page: usize, per_page: usize) -> Self {
        Self {
            filters: BTreeMap::new(),
            sort_by: Vec::new(),
            pagination: PaginationRequest { page, per_page },
        }
    }

    /// Add a filter entry (builder pattern).
    pub fn with_filter(mut self, key: impl Into<String>, value: FilterValue) -> Self {
        self.filters.insert(key.into(), value);
        self
    }

    /// Add a sort key (builder pattern).
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort_by.push(sort);
        self
    }

    /// Copy of this request pointed at another page.
    pub fn for_page(&self, page: usize) -> Self {
        let mut request = self.clone();
        request.pagination.page = page;
        request
    }
}

/// Pagination info returned by the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationInfo {
    /// Page that was served.
    pub page: usize,
    /// Page size used.
    pub per_page: usize,
    /// Whether no further pages exist.
    pub is_last_page: bool,
}

/// Response body from a board endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoardResponse {
    /// Rows for the requested page.
    #[serde(default)]
    pub data: Vec<Record>,

    /// Pagination info.
    #[serde(default)]
    pub pagination: PaginationInfo,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let request = BoardRequest::new(2, 25)
            .with_filter(
                "value_usd",
                FilterValue::Range(RangeBounds {
                    min: Some(1000.0),
                    max: None,
                }),
            )
            .with_filter("chain", FilterValue::AnyOf(vec![json!("ethereum")]))
            .with_sort(SortSpec::desc("value_usd"));

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "filters": {
                    "chain": ["ethereum"],
                    "value_usd": {"min": 1000.0},
                },
                "sortBy": [{"field": "value_usd", "direction": "DESC"}],
                "pagination": {"page": 2, "per_page": 25},
            })
        );
    }

    #[test]
    fn test_filter_value_shapes() {
        let filters: BTreeMap<String, FilterValue> = serde_json::from_value(json!({
            "chain": ["ethereum", "base"],
            "amounts": [100, 200],
            "value_usd": {"min": 5, "max": 10},
            "search": {"fields": ["token_symbol"], "query": "pepe"},
            "empty": {},
        }))
        .unwrap();

        assert!(matches!(filters["chain"], FilterValue::AnyOf(ref v) if v.len() == 2));
        // Numeric arrays stay label sets rather than being read as a range.
        assert!(matches!(filters["amounts"], FilterValue::AnyOf(_)));
        assert_eq!(
            filters["value_usd"],
            FilterValue::Range(RangeBounds {
                min: Some(5.0),
                max: Some(10.0)
            })
        );
        assert!(matches!(filters["search"], FilterValue::Search(ref s) if s.query == "pepe"));
        assert_eq!(filters["empty"], FilterValue::Range(RangeBounds::default()));
    }

    #[test]
    fn test_unknown_filter_object_rejected() {
        let result: Result<FilterValue, _> = serde_json::from_value(json!({"minimum": 5}));
        assert!(result.is_err());
    }

    #[test]
    fn test_request_defaults() {
        let request: BoardRequest = serde_json::from_value(json!({})).unwrap();
        assert!(request.filters.is_empty());
        assert!(request.sort_by.is_empty());
        assert_eq!(request.pagination, PaginationRequest::default());
    }

    #[test]
    fn test_for_page() {
        let request = BoardRequest::new(1, 100).with_sort(SortSpec::asc("date"));
        let next = request.for_page(3);
        assert_eq!(next.pagination.page, 3);
        assert_eq!(next.pagination.per_page, 100);
        assert_eq!(next.sort_by, request.sort_by);
    }

    #[test]
    fn test_response_parsing() {
        let response: BoardResponse = serde_json::from_value(json!({
            "data": [{"token_symbol": "PEPE", "value_usd": 12.5}],
            "pagination": {"page": 1, "per_page": 10, "is_last_page": true},
        }))
        .unwrap();

        assert_eq!(response.data.len(), 1);
        assert_eq!(response.data[0].text("token_symbol"), Some("PEPE"));
        assert!(response.pagination.is_last_page);
    }
}
