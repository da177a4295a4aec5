use thiserror::Error;

use super::model::Field;

/// The loaded table does not match the expected employee schema.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("required column '{column}' is missing")]
    MissingColumn { column: String },

    #[error("column '{column}' is not numeric")]
    NotNumeric { column: String },

    #[error("employee identifier {id} appears {count} times")]
    DuplicateIdentifier { id: String, count: usize },
}

/// A filter selection could not be turned into a predicate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("schema mismatch: {0}")]
    Schema(#[from] SchemaError),

    #[error("invalid {field} range: min {min} is greater than max {max}")]
    InvertedRange { field: Field, min: f64, max: f64 },
}
