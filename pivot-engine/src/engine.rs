//! FILENAME: pivot-engine/src/engine.rs
//! Pivot Builder - folds flat report rows into an aggregation tree.
//!
//! The builder resolves each row's chain of grouping keys, walks the
//! tree with find-or-create semantics one level per grouping field, and
//! folds the measure value into the resulting leaf. Ancestor aggregates
//! recompute immediately, so the tree is consistent after every row.

use log::{debug, trace};

use crate::definition::{AggregationType, PivotField, PivotTableDefinition, SortMode};
use crate::error::PivotError;
use crate::node::{NodeId, PivotTree};
use crate::value::{Row, Value};
use crate::view::{FieldDescriptor, PivotNodeView};

/// Builds a pivot aggregation tree from flat report rows.
///
/// Rows are grouped by the configured fields, outermost level first. A
/// row whose grouping field carries no value lands in an `Empty`-keyed
/// bucket at that level rather than being dropped.
pub struct PivotTable {
    group_fields: Vec<PivotField>,
    value_field: PivotField,
    aggregation: AggregationType,
    tree: PivotTree,
    rows_added: usize,
}

impl PivotTable {
    pub fn new(
        group_fields: Vec<PivotField>,
        value_field: PivotField,
        aggregation: AggregationType,
    ) -> Self {
        PivotTable {
            tree: PivotTree::new(aggregation, SortMode::default()),
            group_fields,
            value_field,
            aggregation,
            rows_added: 0,
        }
    }

    /// Builds an empty table from a validated definition.
    pub fn from_definition(definition: &PivotTableDefinition) -> Result<Self, PivotError> {
        definition.validate()?;
        Ok(PivotTable {
            tree: PivotTree::new(definition.aggregation, definition.sort),
            group_fields: definition.group_fields.clone(),
            value_field: definition.value_field.clone(),
            aggregation: definition.aggregation,
            rows_added: 0,
        })
    }

    /// Folds one row into the tree.
    pub fn add_row(&mut self, row: &Row) {
        let mut node = self.tree.root();
        for i in 0..self.group_fields.len() {
            let key = self.group_fields[i].value_for(row);
            node = self.find_or_create(node, i, key);
        }

        let measure = self.value_field.value_for(row).as_number();
        self.tree.add_value(node, measure);
        self.rows_added += 1;
        trace!("row folded into {}", self.tree.path(node));
    }

    /// Folds every row from an iterator.
    pub fn add_rows<'a, I>(&mut self, rows: I)
    where
        I: IntoIterator<Item = &'a Row>,
    {
        for row in rows {
            self.add_row(row);
        }
        debug!(
            "pivot build: {} rows folded over {} nodes",
            self.rows_added,
            self.tree.len()
        );
    }

    /// The underlying aggregation tree.
    pub fn tree(&self) -> &PivotTree {
        &self.tree
    }

    /// Mutable access for post-build adjustments (sort mode, titles,
    /// switching the aggregation kind).
    pub fn tree_mut(&mut self) -> &mut PivotTree {
        &mut self.tree
    }

    /// Number of rows folded so far.
    pub fn rows_added(&self) -> usize {
        self.rows_added
    }

    /// Raw grand total over every folded row.
    pub fn grand_total(&self) -> f64 {
        self.tree.node(self.tree.root()).aggregator().result()
    }

    /// The serializable report tree, rooted at the grand total.
    pub fn view(&self) -> PivotNodeView {
        PivotNodeView::from_tree(&self.tree, self.tree.root())
    }

    /// Compact descriptors of the grouping fields, for report headers.
    pub fn descriptors(&self) -> Vec<FieldDescriptor> {
        self.group_fields.iter().map(FieldDescriptor::from).collect()
    }

    /// Finds the child of `parent` keyed by `key`, creating it when
    /// missing. A freshly created node gets a title when the field maps
    /// its key to a different display label.
    fn find_or_create(&mut self, parent: NodeId, field_index: usize, key: Value) -> NodeId {
        if let Some(existing) = self.tree.find(parent, &key) {
            return existing;
        }

        let label = self.group_fields[field_index].display_value(&key);
        let raw = key.to_string();
        let id = self.tree.add_child(parent, self.aggregation, key, None);
        if label != raw {
            self.tree.set_title(id, label);
        }
        id
    }
}
