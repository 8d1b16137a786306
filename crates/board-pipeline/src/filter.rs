//! Filter predicates.
//!
//! The boards only ever filter in a few shapes, so [`Filter`] is a closed set
//! of declarative variants plus an escape hatch for caller-supplied logic:
//!
//! - [`Filter::range`]: inclusive numeric bounds, either optional
//! - [`Filter::membership`]: value must be in an active label set
//! - [`Filter::substring`]: case-insensitive search across fields
//! - [`Filter::any`] / [`Filter::negate`]: combinators
//! - [`Filter::custom`]: fallible closure
//!
//! A query ANDs all of its filters together.

use crate::error::PredicateError;
use board_types::{numeric_value, value_key, Record, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Caller-supplied predicate.
pub type PredicateFn = Arc<dyn Fn(&Record) -> Result<bool, PredicateError> + Send + Sync>;

/// A composable test over a [`Record`].
#[derive(Clone)]
pub enum Filter {
    /// `min <= record[field] <= max`, absent bounds always pass.
    Range {
        /// Field to read (missing resolves to zero).
        field: String,
        /// Lower bound (inclusive).
        min: Option<f64>,
        /// Upper bound (inclusive).
        max: Option<f64>,
    },

    /// `record[field]` is one of `allowed`. An empty set means no restriction.
    Membership {
        /// Field to read.
        field: String,
        /// Active labels, keyed by their string form. The value keeps the
        /// JSON type the label arrived with.
        allowed: BTreeMap<String, Value>,
    },

    /// Any of `fields` contains `query`, ignoring case. An empty query passes.
    Substring {
        /// Fields to search in.
        fields: Vec<String>,
        /// Trimmed search text.
        query: String,
    },

    /// At least one inner filter passes.
    Any(Vec<Filter>),

    /// The inner filter fails.
    Not(Box<Filter>),

    /// Caller-supplied predicate.
    Custom {
        /// Name used in error reports.
        name: String,
        /// The predicate.
        predicate: PredicateFn,
    },
}

impl Filter {
    /// Inclusive range filter.
    pub fn range(field: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Self {
        Self::Range {
            field: field.into(),
            min,
            max,
        }
    }

    /// Label-set membership filter.
    pub fn membership<I, S>(field: impl Into<String>, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::membership_values(field, allowed.into_iter().map(|s| Value::String(s.into())))
    }

    /// Label-set membership filter over raw JSON labels, e.g. numeric ids.
    ///
    /// `null`, arrays and objects are skipped; of two labels with the same
    /// string form the first is kept.
    pub fn membership_values<I>(field: impl Into<String>, allowed: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        let mut labels = BTreeMap::new();
        for value in allowed {
            if let Some(key) = value_key(&value) {
                labels.entry(key).or_insert(value);
            }
        }
        Self::Membership {
            field: field.into(),
            allowed: labels,
        }
    }

    /// Case-insensitive substring filter over several fields.
    pub fn substring<I, S>(fields: I, query: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Substring {
            fields: fields.into_iter().map(Into::into).collect(),
            query: query.trim().to_string(),
        }
    }

    /// Passes when any of `filters` passes. An empty list never passes.
    pub fn any(filters: Vec<Filter>) -> Self {
        Self::Any(filters)
    }

    /// Passes when `filter` fails.
    pub fn negate(filter: Filter) -> Self {
        Self::Not(Box::new(filter))
    }

    /// Wrap a caller-supplied predicate.
    pub fn custom<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Record) -> Result<bool, PredicateError> + Send + Sync + 'static,
    {
        Self::Custom {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Short description used in logs and error reports.
    pub fn name(&self) -> String {
        match self {
            Self::Range { field, .. } => format!("range({})", field),
            Self::Membership { field, .. } => format!("membership({})", field),
            Self::Substring { fields, .. } => format!("substring({})", fields.join(",")),
            Self::Any(filters) => {
                let inner: Vec<String> = filters.iter().map(Filter::name).collect();
                format!("any({})", inner.join(", "))
            }
            Self::Not(inner) => format!("not({})", inner.name()),
            Self::Custom { name, .. } => name.clone(),
        }
    }

    /// Whether this filter lets every record through.
    pub fn is_unrestricted(&self) -> bool {
        match self {
            Self::Range { min, max, .. } => min.is_none() && max.is_none(),
            Self::Membership { allowed, .. } => allowed.is_empty(),
            Self::Substring { query, .. } => query.is_empty(),
            Self::Any(_) | Self::Not(_) | Self::Custom { .. } => false,
        }
    }

    /// Test a record.
    ///
    /// Only [`Filter::Custom`] (directly or nested) can fail.
    pub fn test(&self, record: &Record) -> Result<bool, PredicateError> {
        match self {
            Self::Range { field, min, max } => {
                let value = numeric_value(record.get(field));
                let above_min = min.map_or(true, |min| value >= min);
                let below_max = max.map_or(true, |max| value <= max);
                Ok(above_min && below_max)
            }
            Self::Membership { field, allowed } => {
                if allowed.is_empty() {
                    return Ok(true);
                }
                Ok(record
                    .get(field)
                    .map_or(false, |value| value_matches(value, |key| allowed.contains_key(key))))
            }
            Self::Substring { fields, query } => {
                if query.is_empty() {
                    return Ok(true);
                }
                let needle = query.to_lowercase();
                Ok(fields.iter().any(|field| {
                    record.get(field).map_or(false, |value| {
                        value_matches(value, |key| key.to_lowercase().contains(&needle))
                    })
                }))
            }
            Self::Any(filters) => {
                for filter in filters {
                    if filter.test(record)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Self::Not(inner) => Ok(!inner.test(record)?),
            Self::Custom { predicate, .. } => predicate(record),
        }
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Range { field, min, max } => f
                .debug_struct("Range")
                .field("field", field)
                .field("min", min)
                .field("max", max)
                .finish(),
            Self::Membership { field, allowed } => f
                .debug_struct("Membership")
                .field("field", field)
                .field("allowed", &allowed.keys().collect::<Vec<_>>())
                .finish(),
            Self::Substring { fields, query } => f
                .debug_struct("Substring")
                .field("fields", fields)
                .field("query", query)
                .finish(),
            Self::Any(filters) => f.debug_tuple("Any").field(filters).finish(),
            Self::Not(inner) => f.debug_tuple("Not").field(inner).finish(),
            Self::Custom { name, .. } => f.debug_struct("Custom").field("name", name).finish(),
        }
    }
}

/// Apply `test` to a scalar's key, or to each element of an array.
fn value_matches<F>(value: &Value, test: F) -> bool
where
    F: Fn(&str) -> bool,
{
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(value_key)
            .any(|key| test(&key)),
        other => value_key(other).map_or(false, |key| test(&key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        Record::try_from(value).unwrap()
    }

    #[test]
    fn test_range_inclusive_bounds() {
        let filter = Filter::range("value_usd", Some(10.0), Some(20.0));
        assert!(filter.test(&record(json!({"value_usd": 10}))).unwrap());
        assert!(filter.test(&record(json!({"value_usd": 20}))).unwrap());
        assert!(filter.test(&record(json!({"value_usd": 15.5}))).unwrap());
        assert!(!filter.test(&record(json!({"value_usd": 9.99}))).unwrap());
        assert!(!filter.test(&record(json!({"value_usd": 20.01}))).unwrap());
    }

    #[test]
    fn test_range_absent_bounds_never_exclude() {
        let filter = Filter::range("value_usd", None, None);
        assert!(filter.test(&record(json!({"value_usd": -5}))).unwrap());
        assert!(filter.test(&record(json!({"value_usd": "not a number"}))).unwrap());
        assert!(filter.test(&record(json!({}))).unwrap());
        assert!(filter.is_unrestricted());

        let min_only = Filter::range("value_usd", Some(0.0), None);
        assert!(min_only.test(&record(json!({"value_usd": 1e12}))).unwrap());
    }

    #[test]
    fn test_range_missing_field_is_zero() {
        let filter = Filter::range("market_cap_usd", Some(0.0), Some(100.0));
        assert!(filter.test(&record(json!({}))).unwrap());
        assert!(filter.test(&record(json!({"market_cap_usd": null}))).unwrap());

        let positive = Filter::range("market_cap_usd", Some(1.0), None);
        assert!(!positive.test(&record(json!({}))).unwrap());
    }

    #[test]
    fn test_range_numeric_strings() {
        let filter = Filter::range("amount", Some(100.0), None);
        assert!(filter.test(&record(json!({"amount": "150"}))).unwrap());
        assert!(!filter.test(&record(json!({"amount": "abc"}))).unwrap());
    }

    #[test]
    fn test_membership() {
        let filter = Filter::membership("chain", ["ethereum", "base"]);
        assert!(filter.test(&record(json!({"chain": "ethereum"}))).unwrap());
        assert!(!filter.test(&record(json!({"chain": "solana"}))).unwrap());
        assert!(!filter.test(&record(json!({}))).unwrap());
        assert!(!filter.test(&record(json!({"chain": null}))).unwrap());
    }

    #[test]
    fn test_membership_empty_set_is_unrestricted() {
        let filter = Filter::membership("chain", Vec::<String>::new());
        assert!(filter.is_unrestricted());
        assert!(filter.test(&record(json!({"chain": "solana"}))).unwrap());
        assert!(filter.test(&record(json!({}))).unwrap());
    }

    #[test]
    fn test_membership_array_field() {
        let filter = Filter::membership("labels", ["Fund"]);
        assert!(filter
            .test(&record(json!({"labels": ["Smart Trader", "Fund"]})))
            .unwrap());
        assert!(!filter
            .test(&record(json!({"labels": ["Smart Trader"]})))
            .unwrap());
        assert!(!filter.test(&record(json!({"labels": []}))).unwrap());
    }

    #[test]
    fn test_substring() {
        let filter = Filter::substring(["token_symbol", "token_name"], "  PeP ");
        assert!(filter.test(&record(json!({"token_symbol": "PEPE"}))).unwrap());
        assert!(filter
            .test(&record(json!({"token_symbol": "X", "token_name": "pepecoin"})))
            .unwrap());
        assert!(!filter.test(&record(json!({"token_symbol": "WIF"}))).unwrap());
        assert!(!filter.test(&record(json!({}))).unwrap());
    }

    #[test]
    fn test_substring_empty_query_passes() {
        let filter = Filter::substring(["token_symbol"], "   ");
        assert!(filter.is_unrestricted());
        assert!(filter.test(&record(json!({}))).unwrap());
    }

    #[test]
    fn test_any_and_negate() {
        let filter = Filter::any(vec![
            Filter::membership("side", ["buy"]),
            Filter::range("value_usd", Some(1000.0), None),
        ]);
        assert!(filter.test(&record(json!({"side": "buy", "value_usd": 1}))).unwrap());
        assert!(filter.test(&record(json!({"side": "sell", "value_usd": 5000}))).unwrap());
        assert!(!filter.test(&record(json!({"side": "sell", "value_usd": 1}))).unwrap());

        let not_sell = Filter::negate(Filter::membership("side", ["sell"]));
        assert!(not_sell.test(&record(json!({"side": "buy"}))).unwrap());
        assert!(!not_sell.test(&record(json!({"side": "sell"}))).unwrap());

        assert!(!Filter::any(Vec::new()).test(&record(json!({}))).unwrap());
    }

    #[test]
    fn test_custom_error_propagates() {
        let filter = Filter::custom("needs_address", |r: &Record| {
            r.text("address")
                .map(|a| a.starts_with("0x"))
                .ok_or_else(|| PredicateError::new("missing address"))
        });

        assert!(filter.test(&record(json!({"address": "0xabc"}))).unwrap());
        let err = filter.test(&record(json!({}))).unwrap_err();
        assert_eq!(err.message, "missing address");

        // Errors surface through combinators too.
        let nested = Filter::any(vec![Filter::membership("side", ["buy"]), filter]);
        assert!(nested.test(&record(json!({"side": "sell"}))).is_err());
        assert!(nested.test(&record(json!({"side": "buy"}))).unwrap());
    }

    #[test]
    fn test_names() {
        assert_eq!(Filter::range("pnl", None, Some(1.0)).name(), "range(pnl)");
        assert_eq!(
            Filter::negate(Filter::substring(["a", "b"], "x")).name(),
            "not(substring(a,b))"
        );
    }
}
