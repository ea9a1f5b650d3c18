//! Linear (logistic) pipeline loaded from a JSON artifact

use crate::classifier::Classifier;
use crate::encoder::FeatureEncoder;
use crate::InferenceError;
use ndarray::Array1;
use record_table::Table;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Encoder + logistic regression, serialized as one JSON document:
///
/// ```json
/// {
///   "name": "turnover-logreg",
///   "encoder": { "numeric": ["age"], "categorical": [] },
///   "coefficients": [0.04],
///   "intercept": -1.2
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearPipeline {
    pub name: String,
    pub encoder: FeatureEncoder,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearPipeline {
    /// Load and validate an artifact from disk
    pub fn load(path: &Path) -> Result<Self, InferenceError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            InferenceError::ModelLoadError(format!("{}: {}", path.display(), e))
        })?;
        let pipeline = Self::from_json(&raw)?;
        info!(
            "Loaded linear pipeline {} ({} features) from {}",
            pipeline.name,
            pipeline.coefficients.len(),
            path.display()
        );
        Ok(pipeline)
    }

    /// Parse and validate an artifact
    pub fn from_json(raw: &str) -> Result<Self, InferenceError> {
        let pipeline: Self = serde_json::from_str(raw)
            .map_err(|e| InferenceError::ModelLoadError(format!("invalid artifact: {}", e)))?;
        pipeline.validate()?;
        Ok(pipeline)
    }

    fn validate(&self) -> Result<(), InferenceError> {
        self.encoder.validate()?;
        let expected = self.encoder.n_features();
        if self.coefficients.len() != expected {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("{} coefficients", expected),
                actual: format!("{} coefficients", self.coefficients.len()),
            });
        }
        Ok(())
    }

    fn positive_probabilities(&self, features: &Table) -> Result<Vec<f64>, InferenceError> {
        let x = self.encoder.encode(features)?;
        let weights = Array1::from(self.coefficients.clone());
        let scores = x.dot(&weights) + self.intercept;
        debug!("Scored {} rows with {}", scores.len(), self.name);
        Ok(scores.iter().map(|z| sigmoid(*z)).collect())
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl Classifier for LinearPipeline {
    fn predict(&self, features: &Table) -> Result<Vec<u8>, InferenceError> {
        Ok(self
            .positive_probabilities(features)?
            .into_iter()
            .map(|p| u8::from(p > 0.5))
            .collect())
    }

    fn predict_proba(&self, features: &Table) -> Result<Vec<Vec<f64>>, InferenceError> {
        Ok(self
            .positive_probabilities(features)?
            .into_iter()
            .map(|p| vec![1.0 - p, p])
            .collect())
    }

    fn n_features(&self) -> usize {
        self.encoder.n_features()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
