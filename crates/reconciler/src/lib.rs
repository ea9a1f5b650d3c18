//! Table Reconciliation
//!
//! Merges the three HR extracts (SIRH, evaluations, survey) into the
//! feature matrix consumed by the turnover classifier:
//! rename → derive keys → join → normalize → engineer → drop.

mod error;
mod join;
mod keys;
mod normalizer;
mod pipeline;
pub mod schema;

pub use error::ReconcileError;
pub use join::inner_join;
pub use keys::{extract_employee_id, key_column, parse_employee_id, strict_key_column};
pub use normalizer::{normalize_flag, normalize_percentage};
pub use pipeline::{preprocess_input, FeatureMatrix, Reconciler, Reconciliation};

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three raw sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Sirh,
    Evaluation,
    Survey,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Sirh => "sirh",
            SourceKind::Evaluation => "evaluation",
            SourceKind::Survey => "survey",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why reconciliation produced no rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "source", rename_all = "snake_case")]
pub enum EmptyReason {
    /// One of the inputs has no rows
    EmptySource(SourceKind),
    /// The inner join matched no employee
    EmptyJoin,
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyReason::EmptySource(kind) => write!(f, "source table {} is empty", kind),
            EmptyReason::EmptyJoin => write!(f, "no employee is present in all three sources"),
        }
    }
}
