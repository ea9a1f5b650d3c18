//! Reconciliation Error Types

use crate::SourceKind;
use feature_engine::FeatureError;
use record_table::TableError;
use thiserror::Error;

/// Errors during reconciliation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReconcileError {
    /// Key column holds no usable digit run
    #[error("{table} row {row}: cannot extract employee id from {column} = {value:?}")]
    MalformedIdentifier {
        table: SourceKind,
        column: &'static str,
        row: usize,
        value: String,
    },

    /// Key column is absent
    #[error("{table} table has no {column} column")]
    MissingKeyColumn {
        table: SourceKind,
        column: &'static str,
    },

    /// Salary increase text is not `<number> %`
    #[error("Row {row}: malformed percentage {value:?}")]
    MalformedPercentage { row: usize, value: String },

    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error(transparent)]
    Table(#[from] TableError),
}
