//! Record Table
//!
//! Provides the ordered, column-named table shared by the reconciler,
//! the feature engine, the classifiers and the storage layer.

mod table;
mod value;

pub use table::Table;
pub use value::Value;

use thiserror::Error;

/// Errors raised by table operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    #[error("Column not found: {0}")]
    MissingColumn(String),
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),
    #[error("Row {row} has {actual} cells, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },
}
