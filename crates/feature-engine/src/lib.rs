//! Feature Engineering Engine
//!
//! Derives the synthetic numeric columns the turnover model was trained on.
//! The same formulas serve the reconciled batch table and single submitted
//! records.

mod features;

pub use features::{
    EngineeredFeatures, FeatureExtractor, FeatureInputs, FEATURE_DIMENSION, FEATURE_NAMES,
    INPUT_COLUMNS,
};

use thiserror::Error;

/// Errors during feature computation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    #[error("Missing input column: {0}")]
    MissingColumn(&'static str),
    #[error("Row {row}: column {column} is not numeric ({value})")]
    NonNumeric {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("Table error: {0}")]
    Table(#[from] record_table::TableError),
}
