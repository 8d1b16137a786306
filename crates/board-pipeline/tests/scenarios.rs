//! End-to-end scenarios for `process`.

use board_pipeline::{process, Filter, GroupKey, Query, Record, SortDirection};
use serde_json::{json, Value};

fn records(values: impl IntoIterator<Item = Value>) -> Vec<Record> {
    values
        .into_iter()
        .map(|v| Record::try_from(v).unwrap())
        .collect()
}

#[test]
fn test_membership_filter_with_two_pages() {
    let data = records((0..25).map(|i| {
        let chain = if i < 13 { "ethereum" } else { "solana" };
        json!({"id": i, "chain": chain})
    }));

    let query = Query::new()
        .filter(Filter::membership("chain", ["ethereum"]))
        .page(1, 10);
    let result = process(&data, &query).unwrap();

    assert_eq!(result.total_count, 13);
    assert_eq!(result.total_pages, 2);
    assert_eq!(result.page_len(), 10);
    assert!(result.rows.iter().all(|r| r.text("chain") == Some("ethereum")));
}

#[test]
fn test_descending_numeric_sort() {
    let data = records([
        json!({"value_usd": 5}),
        json!({"value_usd": 15}),
        json!({"value_usd": 10}),
    ]);

    let query = Query::new()
        .sort_by("value_usd", SortDirection::Desc)
        .page(1, 10);
    let result = process(&data, &query).unwrap();

    let values: Vec<f64> = result.rows.iter().map(|r| r.number("value_usd")).collect();
    assert_eq!(values, vec![15.0, 10.0, 5.0]);
}

#[test]
fn test_empty_input() {
    let data: Vec<Record> = Vec::new();
    let query = Query::new()
        .filter(Filter::range("value_usd", Some(1.0), None))
        .sort_by("value_usd", SortDirection::Asc)
        .group_by(GroupKey::week_of("date"))
        .page(4, 25);
    let result = process(&data, &query).unwrap();

    assert_eq!(result.total_count, 0);
    assert_eq!(result.total_pages, 1);
    assert_eq!(result.effective_page, 1);
    assert!(result.rows.is_empty());
    assert!(result.groups.is_empty());
    assert!(result.is_empty());
}

#[test]
fn test_out_of_range_page_is_clamped() {
    let data = records((1..=5).map(|i| json!({"id": i})));
    let result = process(&data, &Query::new().page(3, 10)).unwrap();

    assert_eq!(result.total_pages, 1);
    assert_eq!(result.effective_page, 1);
    assert_eq!(result.requested_page, 3);
    assert!(result.page_was_clamped());
    assert_eq!(result.page_len(), 5);
    assert_eq!(result.groups[0].items.len(), 5);
}

#[test]
fn test_week_grouping() {
    // 2024-05-12 and 2024-05-19 are Sundays.
    let data = records([
        json!({"id": 1, "date": "2024-05-13"}),
        json!({"id": 2, "date": "2024-05-20T09:00:00Z"}),
        json!({"id": 3, "date": "2024-05-18"}),
        json!({"id": 4, "date": "2024-05-19"}),
        json!({"id": 5, "date": "2024-05-12T00:00:00Z"}),
    ]);

    let query = Query::new().group_by(GroupKey::week_of("date"));
    let result = process(&data, &query).unwrap();

    assert_eq!(result.groups.len(), 2);
    assert_eq!(result.groups[0].label, "Week of 2024-05-12");
    assert_eq!(result.groups[1].label, "Week of 2024-05-19");

    let ids = |i: usize| -> Vec<f64> {
        result.groups[i].items.iter().map(|r| r.number("id")).collect()
    };
    assert_eq!(ids(0), vec![1.0, 3.0, 5.0]);
    assert_eq!(ids(1), vec![2.0, 4.0]);
}
