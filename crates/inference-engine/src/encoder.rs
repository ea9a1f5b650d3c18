//! Feature Encoding
//!
//! Turns a named, heterogeneous feature table into the dense numeric matrix
//! a trained model expects: selected numeric columns (optionally `log1p`
//! and standard-scaled) followed by one-hot blocks for categorical columns.

use crate::InferenceError;
use ndarray::Array2;
use record_table::Table;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// `log(1 + x)`, applied to skewed numeric columns before scaling
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SafeLogTransform;

impl SafeLogTransform {
    pub fn transform(&self, x: f64) -> f64 {
        x.ln_1p()
    }
}

/// Per-column standardization fitted at training time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    fn apply(&self, idx: usize, x: f64) -> Result<f64, InferenceError> {
        let (Some(&mean), Some(&scale)) = (self.mean.get(idx), self.scale.get(idx)) else {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("scaler entry for column {}", idx),
                actual: format!("{} means, {} scales", self.mean.len(), self.scale.len()),
            });
        };
        if scale == 0.0 {
            Ok(x - mean)
        } else {
            Ok((x - mean) / scale)
        }
    }
}

/// One-hot encoded text column; unknown categories encode as all zeros
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalFeature {
    pub column: String,
    pub categories: Vec<String>,
}

/// Column selection and encoding fitted with the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureEncoder {
    /// Numeric columns, in model order
    pub numeric: Vec<String>,
    /// Subset of `numeric` passed through [`SafeLogTransform`] first
    #[serde(default)]
    pub log1p: Vec<String>,
    /// Scaler over `numeric`, applied after the log transform
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
    /// One-hot blocks appended after the numeric columns
    #[serde(default)]
    pub categorical: Vec<CategoricalFeature>,
}

impl FeatureEncoder {
    /// Width of the encoded matrix
    pub fn n_features(&self) -> usize {
        self.numeric.len()
            + self
                .categorical
                .iter()
                .map(|c| c.categories.len())
                .sum::<usize>()
    }

    /// Check internal consistency of a deserialized encoder
    pub fn validate(&self) -> Result<(), InferenceError> {
        if let Some(scaler) = &self.scaler {
            if scaler.mean.len() != self.numeric.len() || scaler.scale.len() != self.numeric.len() {
                return Err(InferenceError::ModelLoadError(format!(
                    "scaler has {}/{} entries for {} numeric columns",
                    scaler.mean.len(),
                    scaler.scale.len(),
                    self.numeric.len()
                )));
            }
        }
        if let Some(col) = self.log1p.iter().find(|c| !self.numeric.contains(c)) {
            return Err(InferenceError::ModelLoadError(format!(
                "log1p column {} is not a numeric column",
                col
            )));
        }
        Ok(())
    }

    /// Encode every row of `table`
    pub fn encode(&self, table: &Table) -> Result<Array2<f64>, InferenceError> {
        let rows = table.len();
        let width = self.n_features();
        let mut matrix = Array2::<f64>::zeros((rows, width));
        let log = SafeLogTransform;

        for (j, column) in self.numeric.iter().enumerate() {
            let cells = table.column(column).map_err(|_| InferenceError::InvalidInput {
                column: column.clone(),
                row: 0,
                reason: "column missing".to_string(),
            })?;
            let take_log = self.log1p.contains(column);

            for (i, cell) in cells.into_iter().enumerate() {
                let mut x = cell.as_f64().ok_or_else(|| InferenceError::InvalidInput {
                    column: column.clone(),
                    row: i,
                    reason: format!("expected a number, got {}", cell),
                })?;
                if take_log {
                    x = log.transform(x);
                }
                if let Some(scaler) = &self.scaler {
                    x = scaler.apply(j, x)?;
                }
                matrix[[i, j]] = x;
            }
        }

        let mut offset = self.numeric.len();
        for feature in &self.categorical {
            let cells = table
                .column(&feature.column)
                .map_err(|_| InferenceError::InvalidInput {
                    column: feature.column.clone(),
                    row: 0,
                    reason: "column missing".to_string(),
                })?;
            for (i, cell) in cells.into_iter().enumerate() {
                let label = cell.to_string();
                if let Some(k) = feature.categories.iter().position(|c| *c == label) {
                    matrix[[i, offset + k]] = 1.0;
                }
            }
            offset += feature.categories.len();
        }

        debug!("Encoded {} rows into {} model features", rows, width);
        Ok(matrix)
    }
}
