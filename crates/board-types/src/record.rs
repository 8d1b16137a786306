//! Schema-less board records.
//!
//! Every board shows a different row shape (a holding has `chain`,
//! `value_usd` and `market_cap_usd`; a trade has `side`, `action` and
//! `value_usd`), so a [`Record`] is just a JSON object. Typed access goes
//! through two resolution rules shared by filters, sorting and grouping:
//!
//! - [`numeric_value`]: numbers as-is, numeric strings parsed, booleans as
//!   1/0, missing or `null` as `0`, anything else as NaN.
//! - [`value_key`]: a string identity used for label sets, group keys and
//!   de-duplication. `null` has no key.

use crate::TypeError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row of analytics data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field (builder pattern).
    pub fn with_field(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Insert a field, returning the previous value if any.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    /// Raw value of a field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// String value of a field, if the field holds a string.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// Numeric value of a field. Missing fields resolve to `0`.
    pub fn number(&self, field: &str) -> f64 {
        numeric_value(self.0.get(field))
    }

    /// Key of a field's value (see [`value_key`]).
    pub fn key(&self, field: &str) -> Option<String> {
        self.0.get(field).and_then(value_key)
    }

    /// Field names in this record.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume the record into its JSON object.
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Record {
    type Error = TypeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(TypeError::NotAnObject(json_kind(&other).to_string())),
        }
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Object(record.0)
    }
}

/// Resolve a field value to a number.
///
/// Mirrors how the boards coerce values before comparing them: absent
/// values count as zero, numeric strings are parsed, and anything that
/// cannot be read as a number becomes NaN (which fails every comparison).
pub fn numeric_value(value: Option<&Value>) -> f64 {
    match value {
        None | Some(Value::Null) => 0.0,
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        Some(Value::Array(_)) | Some(Value::Object(_)) => f64::NAN,
    }
}

/// Resolve a scalar value to its string key.
///
/// Returns `None` for `null`, arrays and objects.
pub fn value_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_record() -> Record {
        Record::try_from(json!({
            "chain": "solana",
            "value_usd": 2500.5,
            "market_cap_usd": "1200000",
            "is_stablecoin": true,
            "labels": ["Fund", "Smart Trader"],
            "token_name": null,
        }))
        .unwrap()
    }

    #[test]
    fn test_number_resolution() {
        let record = sample_record();
        assert_eq!(record.number("value_usd"), 2500.5);
        assert_eq!(record.number("market_cap_usd"), 1_200_000.0);
        assert_eq!(record.number("is_stablecoin"), 1.0);
        assert_eq!(record.number("token_name"), 0.0);
        assert_eq!(record.number("missing"), 0.0);
        assert!(record.number("chain").is_nan());
        assert!(record.number("labels").is_nan());
    }

    #[test]
    fn test_key_resolution() {
        let record = sample_record();
        assert_eq!(record.key("chain").as_deref(), Some("solana"));
        assert_eq!(record.key("value_usd").as_deref(), Some("2500.5"));
        assert_eq!(record.key("is_stablecoin").as_deref(), Some("true"));
        assert_eq!(record.key("token_name"), None);
        assert_eq!(record.key("labels"), None);
        assert_eq!(record.key("missing"), None);
    }

    #[test]
    fn test_try_from_non_object() {
        let err = Record::try_from(json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, TypeError::NotAnObject(ref kind) if kind == "array"));
    }

    #[test]
    fn test_builder_and_serde() {
        let record = Record::new()
            .with_field("side", "buy")
            .with_field("value_usd", 10);

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"side":"buy","value_usd":10}"#);

        let parsed: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.text("side"), Some("buy"));
    }
}
