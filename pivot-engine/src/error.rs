//! FILENAME: pivot-engine/src/error.rs

use thiserror::Error;

/// Errors raised at the configuration boundary.
///
/// Tree and lookup operations never fail; they report not-found as
/// `None` and ignore absent values. Only loading or validating a
/// definition can go wrong.
#[derive(Error, Debug)]
pub enum PivotError {
    #[error("invalid pivot definition: {0}")]
    InvalidDefinition(#[from] serde_json::Error),

    #[error("pivot field has an empty name")]
    EmptyFieldName,
}
