//! Group keys.
//!
//! A [`GroupKey`] maps each record to a group identity plus a display label.
//! Groups are emitted in order of first appearance in the sorted list, so the
//! key itself never affects ordering.

use crate::error::PredicateError;
use board_types::{Record, Value};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use std::fmt;
use std::sync::Arc;

/// Label for records whose group field is missing.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Label for records whose date cannot be parsed.
pub const UNKNOWN_WEEK_LABEL: &str = "Unknown week";

/// Epoch values at or above this are read as milliseconds, below as seconds.
const EPOCH_MILLIS_THRESHOLD: f64 = 1e11;

/// Caller-supplied group key function.
pub type GroupKeyFn = Arc<dyn Fn(&Record) -> Result<String, PredicateError> + Send + Sync>;

/// Display transform applied to a raw field value.
#[derive(Clone, Default)]
pub enum LabelFormat {
    /// Use the value as-is.
    #[default]
    Raw,
    /// Uppercase the first character (`ethereum` -> `Ethereum`).
    Capitalize,
    /// Uppercase everything.
    Uppercase,
    /// Caller-supplied transform.
    Custom(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl LabelFormat {
    /// Apply the transform.
    pub fn apply(&self, raw: &str) -> String {
        match self {
            Self::Raw => raw.to_string(),
            Self::Capitalize => {
                let mut chars = raw.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
            Self::Uppercase => raw.to_uppercase(),
            Self::Custom(transform) => transform(raw),
        }
    }
}

impl fmt::Debug for LabelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw => f.write_str("Raw"),
            Self::Capitalize => f.write_str("Capitalize"),
            Self::Uppercase => f.write_str("Uppercase"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Group identity and display label for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupAssignment {
    /// Identity used to merge records into the same group.
    pub key: String,
    /// Label shown to the user.
    pub label: String,
}

/// How records are partitioned into groups.
#[derive(Clone)]
pub enum GroupKey {
    /// One group per distinct raw value of `field`.
    Field {
        /// Field to group by.
        field: String,
        /// Label transform.
        format: LabelFormat,
    },

    /// One group per Sunday-start week of a date field.
    WeekOf {
        /// Date field (RFC 3339, `YYYY-MM-DD`, or epoch number).
        field: String,
    },

    /// Everything in one group.
    Singleton {
        /// Label of the single group.
        label: String,
    },

    /// Caller-supplied key; the returned string is both key and label.
    Custom {
        /// Name used in error reports.
        name: String,
        /// Key function.
        key: GroupKeyFn,
    },
}

impl GroupKey {
    /// Group by the raw value of `field`.
    pub fn field(field: impl Into<String>, format: LabelFormat) -> Self {
        Self::Field {
            field: field.into(),
            format,
        }
    }

    /// Group by the week containing `field`.
    pub fn week_of(field: impl Into<String>) -> Self {
        Self::WeekOf {
            field: field.into(),
        }
    }

    /// A single group holding everything.
    pub fn singleton(label: impl Into<String>) -> Self {
        Self::Singleton {
            label: label.into(),
        }
    }

    /// Wrap a caller-supplied key function.
    pub fn custom<F>(name: impl Into<String>, key: F) -> Self
    where
        F: Fn(&Record) -> Result<String, PredicateError> + Send + Sync + 'static,
    {
        Self::Custom {
            name: name.into(),
            key: Arc::new(key),
        }
    }

    /// Short description used in logs and error reports.
    pub fn name(&self) -> String {
        match self {
            Self::Field { field, .. } => format!("field({})", field),
            Self::WeekOf { field } => format!("week_of({})", field),
            Self::Singleton { label } => format!("singleton({})", label),
            Self::Custom { name, .. } => name.clone(),
        }
    }

    /// Compute the group of a record.
    pub fn assign(&self, record: &Record) -> Result<GroupAssignment, PredicateError> {
        match self {
            Self::Field { field, format } => Ok(match record.key(field) {
                Some(raw) => GroupAssignment {
                    label: format.apply(&raw),
                    key: raw,
                },
                None => GroupAssignment {
                    key: String::new(),
                    label: UNKNOWN_LABEL.to_string(),
                },
            }),
            Self::WeekOf { field } => {
                let week = record.get(field).and_then(parse_record_date).map(week_start);
                Ok(match week {
                    Some(start) => GroupAssignment {
                        key: start.to_string(),
                        label: week_label(start),
                    },
                    None => GroupAssignment {
                        key: String::new(),
                        label: UNKNOWN_WEEK_LABEL.to_string(),
                    },
                })
            }
            Self::Singleton { label } => Ok(GroupAssignment {
                key: label.clone(),
                label: label.clone(),
            }),
            Self::Custom { key, .. } => {
                let value = key(record)?;
                Ok(GroupAssignment {
                    key: value.clone(),
                    label: value,
                })
            }
        }
    }
}

impl fmt::Debug for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field { field, format } => f
                .debug_struct("Field")
                .field("field", field)
                .field("format", format)
                .finish(),
            Self::WeekOf { field } => f.debug_struct("WeekOf").field("field", field).finish(),
            Self::Singleton { label } => {
                f.debug_struct("Singleton").field("label", label).finish()
            }
            Self::Custom { name, .. } => f.debug_struct("Custom").field("name", name).finish(),
        }
    }
}

/// Sunday that starts the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_sunday();
    date - Duration::days(i64::from(offset))
}

/// `"Week of YYYY-MM-DD"` for a week starting on `start`.
pub fn week_label(start: NaiveDate) -> String {
    format!("Week of {}", start.format("%Y-%m-%d"))
}

/// Read a calendar date (UTC) from a record value.
///
/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS[.f]` or
/// `YYYY-MM-DD HH:MM:SS[.f]` timestamps, plain `YYYY-MM-DD` dates, and epoch
/// numbers in seconds or milliseconds.
pub fn parse_record_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Number(n) => {
            let raw = n.as_f64()?;
            let millis = if raw.abs() >= EPOCH_MILLIS_THRESHOLD {
                raw
            } else {
                raw * 1000.0
            };
            DateTime::from_timestamp_millis(millis as i64).map(|dt| dt.date_naive())
        }
        Value::String(s) => parse_date_str(s.trim()),
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        Record::try_from(value).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_start_is_sunday() {
        // 2024-05-15 is a Wednesday.
        assert_eq!(week_start(date(2024, 5, 15)), date(2024, 5, 12));
        // Sundays map to themselves.
        assert_eq!(week_start(date(2024, 5, 12)), date(2024, 5, 12));
        // Saturday belongs to the week that started six days earlier.
        assert_eq!(week_start(date(2024, 5, 18)), date(2024, 5, 12));
        // Crossing a month boundary.
        assert_eq!(week_start(date(2024, 6, 1)), date(2024, 5, 26));
    }

    #[test]
    fn test_parse_record_date_formats() {
        let expected = Some(date(2024, 5, 15));
        assert_eq!(parse_record_date(&json!("2024-05-15")), expected);
        assert_eq!(parse_record_date(&json!("2024-05-15T10:30:00Z")), expected);
        assert_eq!(parse_record_date(&json!("2024-05-15T10:30:00.123")), expected);
        assert_eq!(parse_record_date(&json!("2024-05-15 10:30:00")), expected);
        // 2024-05-15T10:30:00Z in seconds and milliseconds.
        assert_eq!(parse_record_date(&json!(1715769000)), expected);
        assert_eq!(parse_record_date(&json!(1715769000000_i64)), expected);
        assert_eq!(parse_record_date(&json!("yesterday")), None);
        assert_eq!(parse_record_date(&json!(null)), None);
    }

    #[test]
    fn test_offset_timestamps_use_utc_date() {
        // 23:30 at UTC-05:00 is already the next day in UTC.
        assert_eq!(
            parse_record_date(&json!("2024-05-15T23:30:00-05:00")),
            Some(date(2024, 5, 16))
        );
    }

    #[test]
    fn test_week_of_assignment() {
        let key = GroupKey::week_of("block_timestamp");
        let assignment = key
            .assign(&record(json!({"block_timestamp": "2024-05-15T08:00:00Z"})))
            .unwrap();
        assert_eq!(assignment.key, "2024-05-12");
        assert_eq!(assignment.label, "Week of 2024-05-12");

        let unknown = key.assign(&record(json!({}))).unwrap();
        assert_eq!(unknown.label, UNKNOWN_WEEK_LABEL);
    }

    #[test]
    fn test_field_assignment_with_format() {
        let key = GroupKey::field("chain", LabelFormat::Capitalize);
        let assignment = key.assign(&record(json!({"chain": "ethereum"}))).unwrap();
        assert_eq!(assignment.key, "ethereum");
        assert_eq!(assignment.label, "Ethereum");

        let missing = key.assign(&record(json!({"chain": null}))).unwrap();
        assert_eq!(missing.key, "");
        assert_eq!(missing.label, UNKNOWN_LABEL);
    }

    #[test]
    fn test_label_formats() {
        assert_eq!(LabelFormat::Raw.apply("solana"), "solana");
        assert_eq!(LabelFormat::Capitalize.apply("solana"), "Solana");
        assert_eq!(LabelFormat::Capitalize.apply(""), "");
        assert_eq!(LabelFormat::Uppercase.apply("dca"), "DCA");
        let custom = LabelFormat::Custom(Arc::new(|raw: &str| format!("[{}]", raw)));
        assert_eq!(custom.apply("open"), "[open]");
    }

    #[test]
    fn test_singleton_and_custom() {
        let all = GroupKey::singleton("All");
        let assignment = all.assign(&record(json!({"x": 1}))).unwrap();
        assert_eq!(assignment.label, "All");

        let status = GroupKey::custom("status", |r: &Record| {
            r.text("status")
                .map(str::to_string)
                .ok_or_else(|| PredicateError::new("no status"))
        });
        assert_eq!(
            status.assign(&record(json!({"status": "open"}))).unwrap().key,
            "open"
        );
        assert!(status.assign(&record(json!({}))).is_err());
    }
}
