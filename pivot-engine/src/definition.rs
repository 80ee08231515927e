//! FILENAME: pivot-engine/src/definition.rs
//! Pivot Table Definition - The serializable configuration.
//!
//! This module contains all the types needed to DESCRIBE a pivot build.
//! These structures are designed to be:
//! - Serializable (report definitions are stored alongside documents)
//! - Immutable snapshots of user intent
//!
//! The definition says nothing about the rows themselves; it only names
//! the fields to group by, the measure to fold in, and how to reduce it.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::PivotError;
use crate::value::{Row, Value};

// ============================================================================
// AGGREGATION
// ============================================================================

/// Supported aggregation functions for the measure field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregationType {
    Sum,
    Count,
    Average,
    Min,
    Max,
}

impl Default for AggregationType {
    fn default() -> Self {
        AggregationType::Sum
    }
}

// ============================================================================
// SORTING
// ============================================================================

/// Ordering maintained over a node's children.
///
/// `None` preserves insertion order. An out-of-range mode cannot be
/// constructed; an unknown mode in a stored definition fails
/// deserialization and surfaces as [`PivotError::InvalidDefinition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortMode {
    Ascending,
    Descending,
    None,
}

impl Default for SortMode {
    fn default() -> Self {
        SortMode::Ascending
    }
}

// ============================================================================
// FIELD DEFINITIONS
// ============================================================================

/// Coercion applied to a raw row value by [`PivotField::value_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldMethod {
    Text,
    Integer,
    Float,
}

impl Default for FieldMethod {
    fn default() -> Self {
        FieldMethod::Text
    }
}

impl FieldMethod {
    fn is_text(&self) -> bool {
        matches!(self, FieldMethod::Text)
    }
}

/// A named, typed accessor that extracts one value out of a flat row.
///
/// Used both for grouping levels and for the measure. Extraction is
/// permissive: a missing or blank entry yields [`Value::Empty`], and
/// coercion never fails (unparseable numeric text collapses to zero).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PivotField {
    /// Row key this field reads. Must be non-empty; enforced when a
    /// definition is validated.
    pub name: String,

    /// Display label. Falls back to `name` where one is needed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Coercion applied to the raw value.
    #[serde(default, skip_serializing_if = "FieldMethod::is_text")]
    pub method: FieldMethod,

    /// Raw-value to display-label overrides, keyed by the stringified
    /// raw value. Display-only; not part of the stored definition.
    #[serde(skip)]
    display_labels: FxHashMap<String, String>,
}

impl PivotField {
    pub fn new(name: impl Into<String>) -> Self {
        PivotField {
            name: name.into(),
            title: None,
            method: FieldMethod::default(),
            display_labels: FxHashMap::default(),
        }
    }

    /// Registers a display label for one raw value (e.g. `"01"` shown
    /// as `"January"`). Unmapped values display as themselves.
    pub fn set_display_label(&mut self, raw: impl Into<String>, label: impl Into<String>) {
        self.display_labels.insert(raw.into(), label.into());
    }

    /// Extracts this field's value from a row.
    ///
    /// A missing entry and a present-but-falsy entry (zero, empty text)
    /// both yield `Empty`; anything else is coerced per `method`.
    pub fn value_for(&self, row: &Row) -> Value {
        let raw = match row.get(&self.name) {
            Some(value) if !value.is_empty() => value,
            _ => return Value::Empty,
        };
        self.coerce(raw)
    }

    /// Display label for an extracted value: the override map first,
    /// the stringified value otherwise.
    pub fn display_value(&self, value: &Value) -> String {
        let raw = value.to_string();
        match self.display_labels.get(&raw) {
            Some(label) => label.clone(),
            None => raw,
        }
    }

    fn coerce(&self, raw: &Value) -> Value {
        match self.method {
            FieldMethod::Text => Value::Text(raw.to_string()),
            FieldMethod::Integer => Value::Integer(match raw {
                Value::Integer(i) => *i,
                Value::Float(f) => *f as i64,
                Value::Text(s) => s.trim().parse::<f64>().map(|f| f as i64).unwrap_or(0),
                Value::Empty => 0,
            }),
            FieldMethod::Float => Value::Float(match raw {
                Value::Integer(i) => *i as f64,
                Value::Float(f) => *f,
                Value::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
                Value::Empty => 0.0,
            }),
        }
    }
}

// ============================================================================
// MAIN DEFINITION STRUCT
// ============================================================================

/// The complete, serializable definition of one pivot build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PivotTableDefinition {
    /// Grouping fields, outermost level first.
    pub group_fields: Vec<PivotField>,

    /// The measure folded into leaf aggregators.
    pub value_field: PivotField,

    /// Reducer applied at every node.
    #[serde(default)]
    pub aggregation: AggregationType,

    /// Child ordering maintained at every node.
    #[serde(default)]
    pub sort: SortMode,
}

impl PivotTableDefinition {
    /// Creates a definition with the default reducer (sum) and ordering
    /// (ascending).
    pub fn new(group_fields: Vec<PivotField>, value_field: PivotField) -> Self {
        PivotTableDefinition {
            group_fields,
            value_field,
            aggregation: AggregationType::default(),
            sort: SortMode::default(),
        }
    }

    /// Loads and validates a definition from JSON.
    pub fn from_json(json: &str) -> Result<Self, PivotError> {
        let definition: PivotTableDefinition = serde_json::from_str(json)?;
        definition.validate()?;
        Ok(definition)
    }

    /// Serializes the definition to JSON.
    pub fn to_json(&self) -> Result<String, PivotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Rejects definitions whose fields cannot address a row.
    pub fn validate(&self) -> Result<(), PivotError> {
        let fields = self.group_fields.iter().chain(std::iter::once(&self.value_field));
        for field in fields {
            if field.name.is_empty() {
                return Err(PivotError::EmptyFieldName);
            }
        }
        Ok(())
    }
}
