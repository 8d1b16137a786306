//! Record ordering.
//!
//! One comparator for every board: numbers compare numerically, strings by
//! plain value, and missing or `null` values count as `0`. Strings holding a
//! finite number (`"1200000"`) compare as that number, the same way range
//! filters read them. When a number meets a string, the number sorts first
//! (ascending).
//!
//! [`sort_records`] is stable, so records with equal keys keep their input
//! order regardless of direction.

use board_types::{Record, SortDirection, SortSpec, Value};
use std::borrow::Cow;
use std::cmp::Ordering;

/// A field value resolved for comparison.
#[derive(Debug, Clone, PartialEq)]
enum SortValue<'a> {
    Number(f64),
    Text(Cow<'a, str>),
}

impl<'a> SortValue<'a> {
    fn resolve(value: Option<&'a Value>) -> Self {
        match value {
            None | Some(Value::Null) => SortValue::Number(0.0),
            Some(Value::Number(n)) => SortValue::Number(n.as_f64().unwrap_or(0.0)),
            Some(Value::Bool(b)) => SortValue::Number(if *b { 1.0 } else { 0.0 }),
            Some(Value::String(s)) => match s.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => SortValue::Number(n),
                _ => SortValue::Text(Cow::Borrowed(s.as_str())),
            },
            Some(other) => SortValue::Text(Cow::Owned(other.to_string())),
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::Number(_), SortValue::Text(_)) => Ordering::Less,
            (SortValue::Text(_), SortValue::Number(_)) => Ordering::Greater,
        }
    }
}

/// Compare two records on a single sort key, honouring its direction.
pub fn compare_by(a: &Record, b: &Record, spec: &SortSpec) -> Ordering {
    let a_val = SortValue::resolve(a.get(&spec.field));
    let b_val = SortValue::resolve(b.get(&spec.field));
    let ordering = a_val.compare(&b_val);
    match spec.direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

/// Compare two records on a list of sort keys, most significant first.
pub fn compare_records(a: &Record, b: &Record, specs: &[SortSpec]) -> Ordering {
    specs
        .iter()
        .map(|spec| compare_by(a, b, spec))
        .find(|ordering| *ordering != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

/// Stable in-place sort of `(input_index, record)` pairs.
///
/// An empty `specs` leaves the order untouched.
pub(crate) fn sort_records(records: &mut [(usize, &Record)], specs: &[SortSpec]) {
    if specs.is_empty() {
        return;
    }
    records.sort_by(|(_, a), (_, b)| compare_records(a, b, specs));
}
