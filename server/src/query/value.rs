//! Typed column values and literal coercion

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};

use super::error::QueryError;

/// Native type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Integer,
    Float,
    Boolean,
    DateTime,
}

impl ValueKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Text => "string",
            ValueKind::Integer => "integer",
            ValueKind::Float => "number",
            ValueKind::Boolean => "boolean",
            ValueKind::DateTime => "datetime",
        }
    }

    /// Whether ordering operators (`gt`, `lt`, ...) apply to this kind
    pub const fn is_ordered(&self) -> bool {
        !matches!(self, ValueKind::Boolean)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field value read from a record
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    DateTime(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Compare two values of the same kind. `None` when either side is null
    /// or the kinds differ.
    pub fn partial_compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => Some(a.as_str().cmp(b.as_str())),
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Total order used for sorting: null first, then by value
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            _ => self.partial_compare(other).unwrap_or(Ordering::Equal),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::DateTime(dt) => dt.serialize(serializer),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Date-time layouts accepted in filter literals, tried in order
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Convert a raw literal into a value of the given kind.
///
/// `column` is only used for error messages.
pub fn coerce(raw: &str, kind: ValueKind, column: &str) -> Result<Value, QueryError> {
    let trimmed = raw.trim();
    match kind {
        ValueKind::Text => Ok(Value::Text(trimmed.to_string())),
        ValueKind::Integer => trimmed
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| QueryError::coercion(column, raw, "expected an integer")),
        ValueKind::Float => parse_float(trimmed)
            .map(Value::Float)
            .ok_or_else(|| QueryError::coercion(column, raw, "expected a number")),
        ValueKind::Boolean => parse_bool(trimmed)
            .map(Value::Boolean)
            .ok_or_else(|| QueryError::coercion(column, raw, "expected true, false, 1 or 0")),
        ValueKind::DateTime => parse_datetime(trimmed)
            .map(Value::DateTime)
            .ok_or_else(|| QueryError::coercion(column, raw, "expected a date or date-time")),
    }
}

fn parse_float(s: &str) -> Option<f64> {
    // Reject inf/nan spellings that f64::from_str accepts
    if !s.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse::<f64>().ok().filter(|f| f.is_finite())
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") || s == "1" {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") || s == "0" {
        Some(false)
    } else {
        None
    }
}

/// Parse RFC 3339, ISO 8601 and the US layouts used by NYC Open Data exports.
/// Offsets are normalized to UTC.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt);
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_coerce_text_trims() {
        assert_eq!(
            coerce("  Spring  ", ValueKind::Text, "campaign").unwrap(),
            Value::Text("Spring".to_string())
        );
    }

    #[test]
    fn test_coerce_integer() {
        assert_eq!(
            coerce("-42", ValueKind::Integer, "nps").unwrap(),
            Value::Integer(-42)
        );
        let err = coerce("4.5", ValueKind::Integer, "nps").unwrap_err();
        assert!(matches!(err, QueryError::TypeCoercion { .. }));
    }

    #[test]
    fn test_coerce_float_invariant() {
        assert_eq!(
            coerce("40.7128", ValueKind::Float, "latitude").unwrap(),
            Value::Float(40.7128)
        );
        assert_eq!(
            coerce("10", ValueKind::Float, "latitude").unwrap(),
            Value::Float(10.0)
        );
        // Comma decimal separators are locale-specific and rejected
        assert!(coerce("40,7", ValueKind::Float, "latitude").is_err());
        assert!(coerce("NaN", ValueKind::Float, "latitude").is_err());
        assert!(coerce("inf", ValueKind::Float, "latitude").is_err());
    }

    #[test]
    fn test_coerce_bool() {
        for (raw, expected) in [
            ("true", true),
            ("TRUE", true),
            ("1", true),
            ("false", false),
            ("False", false),
            ("0", false),
        ] {
            assert_eq!(
                coerce(raw, ValueKind::Boolean, "flag").unwrap(),
                Value::Boolean(expected)
            );
        }
        assert!(coerce("yes", ValueKind::Boolean, "flag").is_err());
    }

    #[test]
    fn test_coerce_datetime_formats() {
        let expected = dt("2024-03-15 14:30:00");
        for raw in [
            "2024-03-15T14:30:00",
            "2024-03-15 14:30:00",
            "2024-03-15T14:30:00Z",
            "2024-03-15T16:30:00+02:00",
            "03/15/2024 02:30:00 PM",
        ] {
            assert_eq!(
                coerce(raw, ValueKind::DateTime, "created_date").unwrap(),
                Value::DateTime(expected),
                "{}",
                raw
            );
        }
        assert_eq!(
            coerce("2024-03-15", ValueKind::DateTime, "created_date").unwrap(),
            Value::DateTime(dt("2024-03-15 00:00:00"))
        );
        assert!(coerce("15th March", ValueKind::DateTime, "created_date").is_err());
    }

    #[test]
    fn test_partial_compare_null_is_none() {
        assert_eq!(Value::Null.partial_compare(&Value::Integer(1)), None);
        assert_eq!(
            Value::Integer(1).partial_compare(&Value::Integer(2)),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn test_text_compare_is_ordinal() {
        // Uppercase sorts before lowercase in ordinal order
        assert_eq!(
            Value::Text("Zebra".into()).partial_compare(&Value::Text("apple".into())),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn test_sort_cmp_nulls_first() {
        assert_eq!(Value::Null.sort_cmp(&Value::Integer(0)), Ordering::Less);
        assert_eq!(Value::Integer(0).sort_cmp(&Value::Null), Ordering::Greater);
        assert_eq!(Value::Null.sort_cmp(&Value::Null), Ordering::Equal);
    }

    #[test]
    fn test_option_into_value() {
        let none: Option<String> = None;
        assert_eq!(Value::from(none), Value::Null);
        assert_eq!(Value::from(Some(7_i64)), Value::Integer(7));
    }

    #[test]
    fn test_serialize_values() {
        let json = serde_json::to_value(vec![
            Value::Null,
            Value::Text("a".into()),
            Value::Integer(3),
            Value::Boolean(true),
            Value::DateTime(dt("2024-03-15 14:30:00")),
        ])
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!([null, "a", 3, true, "2024-03-15T14:30:00"])
        );
    }
}
