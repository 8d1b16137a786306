//! The list-processing pipeline.
//!
//! [`process`] runs filter, sort, page window and grouping, in that order,
//! over a borrowed slice of records. It never mutates or clones the input:
//! the result holds references into it.
//!
//! # Example
//!
//! ```rust
//! use board_pipeline::{process, Filter, GroupKey, LabelFormat, Query, Record, SortDirection};
//! use serde_json::json;
//!
//! let records: Vec<Record> = vec![
//!     json!({"chain": "ethereum", "value_usd": 5}),
//!     json!({"chain": "solana", "value_usd": 15}),
//!     json!({"chain": "ethereum", "value_usd": 10}),
//! ]
//! .into_iter()
//! .map(|v| Record::try_from(v).unwrap())
//! .collect();
//!
//! let query = Query::new()
//!     .filter(Filter::range("value_usd", Some(6.0), None))
//!     .sort_by("value_usd", SortDirection::Desc)
//!     .group_by(GroupKey::field("chain", LabelFormat::Capitalize));
//!
//! let result = process(&records, &query).unwrap();
//! assert_eq!(result.total_count, 2);
//! assert_eq!(result.groups[0].label, "Solana");
//! assert_eq!(result.groups[1].label, "Ethereum");
//! ```

use crate::error::PipelineError;
use crate::group::GroupKey;
use crate::query::Query;
use crate::sort::sort_records;
use board_types::Record;
use serde::Serialize;
use std::collections::HashMap;
use std::ops::Range;

/// One group of the result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group<'a> {
    /// Group identity.
    pub key: String,

    /// Display label.
    pub label: String,

    /// Number of filtered records in this group across all pages.
    pub total_in_group: usize,

    /// Records of this group on the current page, in sorted order.
    pub items: Vec<&'a Record>,
}

/// Output of [`process`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineResult<'a> {
    /// Every non-empty group of the filtered set, in order of first
    /// appearance in the sorted list. Groups whose records all fall on other
    /// pages have empty `items`.
    pub groups: Vec<Group<'a>>,

    /// Number of records that passed every filter.
    pub total_count: usize,

    /// `max(1, ceil(total_count / per_page))`.
    pub total_pages: usize,

    /// The page actually served, clamped into `1..=total_pages`.
    pub effective_page: usize,

    /// The page the query asked for.
    pub requested_page: usize,

    /// Page size.
    pub per_page: usize,

    /// The current page as a flat sorted list.
    #[serde(skip)]
    pub rows: Vec<&'a Record>,
}

impl<'a> PipelineResult<'a> {
    /// True when nothing passed the filters.
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    /// True when the requested page was out of range and a different page
    /// was served. Callers re-issue the query at `effective_page`.
    pub fn page_was_clamped(&self) -> bool {
        self.requested_page != self.effective_page
    }

    /// Number of records on the current page.
    pub fn page_len(&self) -> usize {
        self.rows.len()
    }

    /// Groups that have records on the current page.
    pub fn page_groups(&self) -> impl Iterator<Item = &Group<'a>> {
        self.groups.iter().filter(|group| !group.items.is_empty())
    }
}

/// Run a query over a slice of records.
///
/// Filters are ANDed, the sort is stable (ties keep input order), and the
/// page is clamped rather than rejected when it is past the end. Grouping
/// runs over the full filtered list so every group knows its total, but only
/// current-page records are placed in `items`.
///
/// # Errors
///
/// [`PipelineError::InvalidQuery`] for a zero page or page size, and
/// [`PipelineError::Predicate`] when a custom filter or group key fails.
pub fn process<'a>(records: &'a [Record], query: &Query) -> Result<PipelineResult<'a>, PipelineError> {
    query.validate()?;

    let mut matched = apply_filters(records, query)?;
    sort_records(&mut matched, &query.sort);

    let total_count = matched.len();
    let per_page = query.per_page;
    let total_pages = total_count.div_ceil(per_page).max(1);
    let effective_page = query.page.clamp(1, total_pages);
    let window = page_window(effective_page, per_page, total_count);

    let implicit;
    let group_key = match &query.group_by {
        Some(key) => key,
        None => {
            implicit = GroupKey::singleton(query.default_group_label.clone());
            &implicit
        }
    };
    let groups = build_groups(&matched, group_key, &window)?;
    let rows: Vec<&'a Record> = matched[window].iter().map(|(_, record)| *record).collect();

    tracing::debug!(
        "Processed {} records: {} matched, page {}/{} ({} rows, {} groups)",
        records.len(),
        total_count,
        effective_page,
        total_pages,
        rows.len(),
        groups.len()
    );

    Ok(PipelineResult {
        groups,
        total_count,
        total_pages,
        effective_page,
        requested_page: query.page,
        per_page,
        rows,
    })
}

/// Keep the records that pass every filter, tagged with their input index.
fn apply_filters<'a>(
    records: &'a [Record],
    query: &Query,
) -> Result<Vec<(usize, &'a Record)>, PipelineError> {
    let mut matched = Vec::with_capacity(records.len());

    'records: for (index, record) in records.iter().enumerate() {
        for filter in &query.filters {
            let passed = filter
                .test(record)
                .map_err(|source| PipelineError::Predicate {
                    name: filter.name(),
                    index,
                    source,
                })?;
            if !passed {
                continue 'records;
            }
        }
        matched.push((index, record));
    }

    Ok(matched)
}

/// Index range of the sorted list shown on `page`.
fn page_window(page: usize, per_page: usize, total: usize) -> Range<usize> {
    let start = ((page - 1) * per_page).min(total);
    let end = (start + per_page).min(total);
    start..end
}

fn build_groups<'a>(
    sorted: &[(usize, &'a Record)],
    key: &GroupKey,
    window: &Range<usize>,
) -> Result<Vec<Group<'a>>, PipelineError> {
    let mut groups: Vec<Group<'a>> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();

    for (position, (index, record)) in sorted.iter().enumerate() {
        let assignment = key.assign(record).map_err(|source| PipelineError::Predicate {
            name: key.name(),
            index: *index,
            source,
        })?;

        let slot = match slots.get(&assignment.key) {
            Some(&slot) => slot,
            None => {
                groups.push(Group {
                    key: assignment.key.clone(),
                    label: assignment.label,
                    total_in_group: 0,
                    items: Vec::new(),
                });
                slots.insert(assignment.key, groups.len() - 1);
                groups.len() - 1
            }
        };

        let group = &mut groups[slot];
        group.total_in_group += 1;
        if window.contains(&position) {
            group.items.push(*record);
        }
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PredicateError;
    use crate::filter::Filter;
    use crate::group::LabelFormat;
    use board_types::SortDirection;
    use serde_json::json;

    fn records(values: Vec<serde_json::Value>) -> Vec<Record> {
        values
            .into_iter()
            .map(|v| Record::try_from(v).unwrap())
            .collect()
    }

    fn ids(rows: &[&Record]) -> Vec<f64> {
        rows.iter().map(|r| r.number("id")).collect()
    }

    #[test]
    fn test_page_window() {
        assert_eq!(page_window(1, 10, 25), 0..10);
        assert_eq!(page_window(3, 10, 25), 20..25);
        assert_eq!(page_window(1, 10, 0), 0..0);
    }

    #[test]
    fn test_implicit_group_uses_default_label() {
        let data = records(vec![json!({"id": 1}), json!({"id": 2})]);
        let result = process(&data, &Query::new().default_group_label("Holdings")).unwrap();

        assert_eq!(result.groups.len(), 1);
        assert_eq!(result.groups[0].label, "Holdings");
        assert_eq!(result.groups[0].total_in_group, 2);
    }

    #[test]
    fn test_groups_follow_sorted_order() {
        let data = records(vec![
            json!({"id": 1, "chain": "base", "value_usd": 1}),
            json!({"id": 2, "chain": "solana", "value_usd": 30}),
            json!({"id": 3, "chain": "base", "value_usd": 20}),
        ]);
        let query = Query::new()
            .sort_by("value_usd", SortDirection::Desc)
            .group_by(GroupKey::field("chain", LabelFormat::Raw));
        let result = process(&data, &query).unwrap();

        let labels: Vec<&str> = result.groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["solana", "base"]);
        assert_eq!(ids(&result.groups[1].items), vec![3.0, 1.0]);
    }

    #[test]
    fn test_group_totals_span_pages() {
        let data = records(
            (1..=6)
                .map(|i| json!({"id": i, "side": if i <= 4 { "buy" } else { "sell" }}))
                .collect(),
        );
        let query = Query::new()
            .group_by(GroupKey::field("side", LabelFormat::Raw))
            .page(1, 3);
        let result = process(&data, &query).unwrap();

        assert_eq!(result.groups.len(), 2);
        assert_eq!(result.groups[0].total_in_group, 4);
        assert_eq!(result.groups[0].items.len(), 3);
        assert_eq!(result.groups[1].total_in_group, 2);
        assert!(result.groups[1].items.is_empty());
        assert_eq!(result.page_groups().count(), 1);
    }

    #[test]
    fn test_rejects_zero_page_size() {
        let data = records(vec![json!({"id": 1})]);
        assert!(matches!(
            process(&data, &Query::new().page(1, 0)),
            Err(PipelineError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_predicate_error_reports_record_index() {
        let data = records(vec![json!({"id": 1}), json!({"id": 2, "bad": true})]);
        let query = Query::new().filter(Filter::custom("no_bad", |r: &Record| {
            if r.get("bad").is_some() {
                Err(PredicateError::new("bad record"))
            } else {
                Ok(true)
            }
        }));

        match process(&data, &query) {
            Err(PipelineError::Predicate { name, index, .. }) => {
                assert_eq!(name, "no_bad");
                assert_eq!(index, 1);
            }
            other => panic!("expected predicate error, got {:?}", other.map(|r| r.total_count)),
        }
    }

    #[test]
    fn test_group_key_error_reports_record_index() {
        let data = records(vec![json!({"id": 1, "status": "open"}), json!({"id": 2})]);
        let query = Query::new().group_by(GroupKey::custom("status", |r: &Record| {
            r.text("status")
                .map(str::to_string)
                .ok_or_else(|| PredicateError::new("missing status"))
        }));

        assert!(matches!(
            process(&data, &query),
            Err(PipelineError::Predicate { index: 1, .. })
        ));
    }

    #[test]
    fn test_serializes_without_rows() {
        let data = records(vec![json!({"id": 1})]);
        let result = process(&data, &Query::new()).unwrap();
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["total_count"], 1);
        assert_eq!(value["groups"][0]["items"][0]["id"], 1);
        assert!(value.get("rows").is_none());
    }
}
