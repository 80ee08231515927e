//! FILENAME: pivot-engine/src/value.rs
//! Scalar values shared by report rows, grouping keys, and coercion.
//!
//! One `Value` type plays every scalar role in the engine: a cell inside
//! a flat report row, a grouping key inside the tree, and the output of
//! field coercion. Keeping these in a single type gives the whole crate
//! one definition of "empty" and one ordering for sorted children.

use std::cmp::Ordering;
use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A flat report row: field name to raw scalar value.
///
/// Rows are produced by calling code that has already queried and
/// flattened domain entities; the engine only reads them.
pub type Row = FxHashMap<String, Value>;

// ============================================================================
// VALUE
// ============================================================================

/// A scalar from a flat report row.
///
/// `Empty` stands in for both "field missing" and "field present but
/// blank" - the two are indistinguishable once a value has passed
/// through field extraction (see [`Value::is_empty`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Empty,
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// The falsy-is-absent convention: `Empty`, zero, and empty text all
    /// count as "no value".
    ///
    /// Field extraction and view serialization share this predicate, so
    /// a zero measure disappears from the serialized report the same way
    /// a missing row field does. Callers with legitimately-zero measures
    /// must encode them differently before handing rows to the engine.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Empty => true,
            Value::Integer(i) => *i == 0,
            Value::Float(f) => *f == 0.0,
            Value::Text(s) => s.is_empty(),
        }
    }

    /// Numeric view used by aggregation.
    ///
    /// Text that parses as a number is accepted; anything else
    /// contributes nothing to an aggregate.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Empty => None,
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    /// Total ordering used for sorted children: empty first, then
    /// numbers, then text. `Integer` and `Float` compare numerically.
    ///
    /// Keys are expected to be one consistent type within a tree; the
    /// cross-type arms keep a mixed tree deterministic rather than
    /// panicking mid-sort.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Empty, Value::Empty) => Ordering::Equal,
            (Value::Empty, _) => Ordering::Less,
            (_, Value::Empty) => Ordering::Greater,

            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Integer(a), Value::Float(b)) => {
                (*a as f64).partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (Value::Float(a), Value::Integer(b)) => {
                a.partial_cmp(&(*b as f64)).unwrap_or(Ordering::Equal)
            }
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Value::Integer(_), Value::Text(_)) | (Value::Float(_), Value::Text(_)) => {
                Ordering::Less
            }
            (Value::Text(_), Value::Integer(_)) | (Value::Text(_), Value::Float(_)) => {
                Ordering::Greater
            }

            (Value::Text(a), Value::Text(b)) => a.cmp(b),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_falsy_values_are_empty() {
        assert!(Value::Empty.is_empty());
        assert!(Value::Integer(0).is_empty());
        assert!(Value::Float(0.0).is_empty());
        assert!(Value::Text(String::new()).is_empty());

        assert!(!Value::Integer(-1).is_empty());
        assert!(!Value::Float(0.5).is_empty());
        assert!(!Value::Text("0".to_string()).is_empty());
    }

    #[test]
    fn test_equality_is_strict() {
        // An integer key never matches a float or text key.
        assert_ne!(Value::Integer(1), Value::Float(1.0));
        assert_ne!(Value::Integer(2023), Value::Text("2023".to_string()));
        assert_eq!(Value::Text("2023".to_string()), Value::from("2023"));
    }

    #[test]
    fn test_compare_orders_empty_numbers_text() {
        let empty = Value::Empty;
        let num = Value::Integer(5);
        let text = Value::from("alpha");

        assert_eq!(empty.compare(&num), Ordering::Less);
        assert_eq!(num.compare(&text), Ordering::Less);
        assert_eq!(text.compare(&empty), Ordering::Greater);
    }

    #[test]
    fn test_compare_is_numeric_across_kinds() {
        assert_eq!(Value::Integer(2).compare(&Value::Float(2.5)), Ordering::Less);
        assert_eq!(Value::Float(3.0).compare(&Value::Integer(2)), Ordering::Greater);
        assert_eq!(Value::Integer(2).compare(&Value::Float(2.0)), Ordering::Equal);
    }

    #[test]
    fn test_as_number() {
        assert_eq!(Value::Integer(7).as_number(), Some(7.0));
        assert_eq!(Value::Float(1.25).as_number(), Some(1.25));
        assert_eq!(Value::from(" 12.5 ").as_number(), Some(12.5));
        assert_eq!(Value::from("n/a").as_number(), None);
        assert_eq!(Value::Empty.as_number(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Integer(2023).to_string(), "2023");
        assert_eq!(Value::Float(12.5).to_string(), "12.5");
        assert_eq!(Value::from("01").to_string(), "01");
        assert_eq!(Value::Empty.to_string(), "");
    }

    #[test]
    fn test_serde_untagged() {
        assert_eq!(serde_json::to_value(Value::Integer(3)).unwrap(), json!(3));
        assert_eq!(serde_json::to_value(Value::from("01")).unwrap(), json!("01"));
        assert_eq!(serde_json::to_value(Value::Empty).unwrap(), json!(null));

        let v: Value = serde_json::from_value(json!(12.5)).unwrap();
        assert_eq!(v, Value::Float(12.5));
        let v: Value = serde_json::from_value(json!(12)).unwrap();
        assert_eq!(v, Value::Integer(12));
    }
}
