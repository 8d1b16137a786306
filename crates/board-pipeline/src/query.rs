//! The query value object.
//!
//! A [`Query`] collects everything a board view used to keep as loose state
//! (page, page size, sort column, filter inputs) into one immutable value.
//! A view builds a new query on each interaction and hands it to
//! [`process`](crate::process), or converts it with [`Query::to_request`]
//! when the board lets the upstream API do the work.

use crate::error::PipelineError;
use crate::filter::Filter;
use crate::group::GroupKey;
use board_types::{
    BoardRequest, FilterValue, PaginationRequest, RangeBounds, SearchSpec, SortDirection, SortSpec,
    DEFAULT_PAGE, DEFAULT_PER_PAGE,
};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Label of the implicit group when no grouping is requested.
pub const DEFAULT_GROUP_LABEL: &str = "All";

/// Filter key used for the first search filter sent upstream.
const SEARCH_KEY: &str = "search";

/// A declarative list-processing request.
#[derive(Debug, Clone)]
pub struct Query {
    /// Filters, all of which must pass.
    pub filters: Vec<Filter>,

    /// Sort keys, most significant first. Empty keeps input order.
    pub sort: Vec<SortSpec>,

    /// Optional grouping. `None` puts everything in one group.
    pub group_by: Option<GroupKey>,

    /// Label of the implicit group used when `group_by` is `None`.
    pub default_group_label: String,

    /// 1-indexed page.
    pub page: usize,

    /// Page size.
    pub per_page: usize,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            sort: Vec::new(),
            group_by: None,
            default_group_label: DEFAULT_GROUP_LABEL.to_string(),
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl Query {
    /// Unfiltered, unsorted first page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Add a sort key. Later keys break ties of earlier ones.
    pub fn sort_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort.push(SortSpec::new(field, direction));
        self
    }

    /// Set grouping.
    pub fn group_by(mut self, key: GroupKey) -> Self {
        self.group_by = Some(key);
        self
    }

    /// Set the label of the implicit group.
    pub fn default_group_label(mut self, label: impl Into<String>) -> Self {
        self.default_group_label = label.into();
        self
    }

    /// Set the page window.
    pub fn page(mut self, page: usize, per_page: usize) -> Self {
        self.page = page;
        self.per_page = per_page;
        self
    }

    /// Copy of this query at another page (e.g. after the page was clamped).
    pub fn at_page(&self, page: usize) -> Self {
        let mut query = self.clone();
        query.page = page;
        query
    }

    /// Check the page window.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.page == 0 {
            return Err(PipelineError::InvalidQuery("page must be at least 1".to_string()));
        }
        if self.per_page == 0 {
            return Err(PipelineError::InvalidQuery(
                "per_page must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Build a query from an upstream request payload.
    ///
    /// Filters come back ordered by key. Grouping is not part of the payload.
    pub fn from_request(request: &BoardRequest) -> Self {
        let filters = request
            .filters
            .iter()
            .map(|(key, value)| match value {
                FilterValue::Range(bounds) => Filter::range(key.clone(), bounds.min, bounds.max),
                FilterValue::AnyOf(values) => {
                    Filter::membership_values(key.clone(), values.iter().cloned())
                }
                FilterValue::Search(search) => {
                    Filter::substring(search.fields.iter().cloned(), &search.query)
                }
            })
            .collect();

        Self {
            filters,
            sort: request.sort_by.clone(),
            page: request.pagination.page,
            per_page: request.pagination.per_page,
            ..Self::default()
        }
    }

    /// Convert into an upstream request payload.
    ///
    /// Unrestricted filters are left out. Two range filters on the same field
    /// are merged into their intersection. Combinators, custom predicates and
    /// any other key collision cannot be expressed and fail with
    /// [`PipelineError::NotRepresentable`].
    pub fn to_request(&self) -> Result<BoardRequest, PipelineError> {
        let mut filters: BTreeMap<String, FilterValue> = BTreeMap::new();

        for filter in &self.filters {
            if filter.is_unrestricted() {
                continue;
            }
            match filter {
                Filter::Range { field, min, max } => match filters.entry(field.clone()) {
                    Entry::Vacant(slot) => {
                        slot.insert(FilterValue::Range(RangeBounds {
                            min: *min,
                            max: *max,
                        }));
                    }
                    Entry::Occupied(mut slot) => match slot.get_mut() {
                        FilterValue::Range(existing) => {
                            existing.min = tighter(existing.min, *min, f64::max);
                            existing.max = tighter(existing.max, *max, f64::min);
                        }
                        _ => return Err(duplicate_key(field)),
                    },
                },
                Filter::Membership { field, allowed } => {
                    let values = allowed.values().cloned().collect();
                    insert_unique(&mut filters, field.clone(), FilterValue::AnyOf(values))?;
                }
                Filter::Substring { fields, query } => {
                    let key = search_key(&filters);
                    filters.insert(
                        key,
                        FilterValue::Search(SearchSpec {
                            fields: fields.clone(),
                            query: query.clone(),
                        }),
                    );
                }
                Filter::Any(_) | Filter::Not(_) | Filter::Custom { .. } => {
                    return Err(PipelineError::NotRepresentable(format!(
                        "filter `{}` has no upstream form",
                        filter.name()
                    )));
                }
            }
        }

        Ok(BoardRequest {
            filters,
            sort_by: self.sort.clone(),
            pagination: PaginationRequest {
                page: self.page,
                per_page: self.per_page,
            },
        })
    }
}

/// Combine two optional bounds, keeping the stricter one.
fn tighter(a: Option<f64>, b: Option<f64>, pick: fn(f64, f64) -> f64) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(pick(a, b)),
        (a, b) => a.or(b),
    }
}

fn insert_unique(
    filters: &mut BTreeMap<String, FilterValue>,
    key: String,
    value: FilterValue,
) -> Result<(), PipelineError> {
    match filters.entry(key) {
        Entry::Vacant(slot) => {
            slot.insert(value);
            Ok(())
        }
        Entry::Occupied(slot) => Err(duplicate_key(slot.key())),
    }
}

fn duplicate_key(key: &str) -> PipelineError {
    PipelineError::NotRepresentable(format!("more than one filter on `{}`", key))
}

/// First free search key: `search`, `search_2`, `search_3`, ...
fn search_key(filters: &BTreeMap<String, FilterValue>) -> String {
    if !filters.contains_key(SEARCH_KEY) {
        return SEARCH_KEY.to_string();
    }
    (2..)
        .map(|n| format!("{}_{}", SEARCH_KEY, n))
        .find(|key| !filters.contains_key(key))
        .unwrap_or_else(|| SEARCH_KEY.to_string())
}
