//! FILENAME: pivot-engine/src/view.rs
//! Pivot View - the serializable report tree.
//!
//! This module transforms an aggregation tree into the nested
//! `{key, title, value, children}` objects embedded into report
//! documents. Every member is omitted when absent, following the same
//! falsy-is-absent convention as field extraction: a zero aggregate
//! disappears from the report exactly like a missing row field.

use serde::{Deserialize, Serialize};

use crate::definition::PivotField;
use crate::node::{NodeId, PivotTree};
use crate::value::Value;

// ============================================================================
// FIELD DESCRIPTOR
// ============================================================================

/// Compact descriptor of a configured field, for report headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl From<&PivotField> for FieldDescriptor {
    fn from(field: &PivotField) -> Self {
        FieldDescriptor {
            name: field.name.clone(),
            title: field.title.clone(),
        }
    }
}

// ============================================================================
// NODE VIEW
// ============================================================================

/// One serialized pivot node.
///
/// A node with no key, no title, an empty aggregate, and no children
/// serializes to `{}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotNodeView {
    /// Grouping key; omitted when falsy (the root, and empty buckets).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Value>,

    /// Explicit display label; omitted when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Formatted aggregate; omitted when the raw result is zero, so a
    /// zero total disappears from the serialized report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,

    /// Child views in maintained child order; omitted when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PivotNodeView>,
}

impl PivotNodeView {
    /// Builds the view of `node` and its whole subtree.
    pub fn from_tree(tree: &PivotTree, node: NodeId) -> Self {
        let n = tree.node(node);

        let key = if n.key().is_empty() {
            None
        } else {
            Some(n.key().clone())
        };

        // Presence is decided on the raw result, the emitted number is
        // the formatted one.
        let value = if n.aggregator().result() == 0.0 {
            None
        } else {
            Some(n.aggregator().formatted_result())
        };

        let children = tree
            .children(node)
            .iter()
            .map(|&child| PivotNodeView::from_tree(tree, child))
            .collect();

        PivotNodeView {
            key,
            title: n.title().map(str::to_string),
            value,
            children,
        }
    }
}
