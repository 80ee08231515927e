//! FILENAME: pivot-engine/src/lib.rs
//! Pivot aggregation engine for report generation.
//!
//! This crate builds grouped aggregation trees out of flat report rows:
//! rows are grouped level by level over the configured fields, measure
//! values are folded into leaf aggregators, and every ancestor
//! recomputes bottom-up so the root always carries the grand total.
//! The finished tree serializes into the nested objects embedded in
//! report documents.
//!
//! Layers:
//! - `definition`: Serializable configuration (what the pivot table IS)
//! - `value` / `aggregate` / `node`: In-memory tree (HOW we compute)
//! - `view`: Serializable output for report renderers (WHAT we display)
//! - `engine`: Row-folding builder (HOW we calculate)

pub mod aggregate;
pub mod definition;
pub mod engine;
pub mod error;
pub mod node;
pub mod value;
pub mod view;

pub use aggregate::Aggregator;
pub use definition::{AggregationType, FieldMethod, PivotField, PivotTableDefinition, SortMode};
pub use engine::PivotTable;
pub use error::PivotError;
pub use node::{NodeId, PivotNode, PivotTree, ROOT};
pub use value::{Row, Value};
pub use view::{FieldDescriptor, PivotNodeView};
