//! ONNX pipeline executed with tract
//!
//! The model takes one float input of shape `[n, k]` and exposes a
//! probability output of shape `[n, 2]` (scikit-learn exports with
//! `zipmap=False`). Column selection lives in a JSON sidecar next to the
//! model: `model.onnx` → `model.encoder.json`.

use crate::classifier::Classifier;
use crate::encoder::FeatureEncoder;
use crate::InferenceError;
use record_table::Table;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tract_onnx::prelude::*;

type OnnxPlan = TypedRunnableModel<TypedModel>;

/// ONNX model plus the encoder that feeds it
pub struct OnnxPipeline {
    name: String,
    encoder: FeatureEncoder,
    plan: OnnxPlan,
}

impl OnnxPipeline {
    /// Sidecar encoder path for a model path
    pub fn encoder_path(model_path: &Path) -> PathBuf {
        model_path.with_extension("encoder.json")
    }

    /// Load the model and its sidecar encoder
    pub fn load(model_path: &Path) -> Result<Self, InferenceError> {
        let encoder_path = Self::encoder_path(model_path);
        let raw = std::fs::read_to_string(&encoder_path).map_err(|e| {
            InferenceError::ModelLoadError(format!("{}: {}", encoder_path.display(), e))
        })?;
        let encoder: FeatureEncoder = serde_json::from_str(&raw).map_err(|e| {
            InferenceError::ModelLoadError(format!("invalid encoder sidecar: {}", e))
        })?;
        encoder.validate()?;

        let plan = tract_onnx::onnx()
            .model_for_path(model_path)
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| {
                InferenceError::ModelLoadError(format!("{}: {}", model_path.display(), e))
            })?;

        let name = model_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "onnx".to_string());
        info!(
            "Loaded ONNX pipeline {} ({} encoded features)",
            name,
            encoder.n_features()
        );

        Ok(Self {
            name,
            encoder,
            plan,
        })
    }

    fn run(&self, features: &Table) -> Result<Vec<Vec<f64>>, InferenceError> {
        let encoded = self.encoder.encode(features)?;
        let (rows, cols) = encoded.dim();
        let data: Vec<f32> = encoded.iter().map(|v| *v as f32).collect();

        let input: Tensor = tract_ndarray::Array2::from_shape_vec((rows, cols), data)
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?
            .into();
        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        for output in outputs.iter() {
            let Ok(view) = output.to_array_view::<f32>() else {
                continue;
            };
            if view.ndim() == 2 && view.shape() == [rows, 2].as_slice() {
                debug!("ONNX pipeline {} scored {} rows", self.name, rows);
                return Ok(view
                    .outer_iter()
                    .map(|row| row.iter().map(|p| *p as f64).collect())
                    .collect());
            }
        }

        Err(InferenceError::InvalidInputShape {
            expected: format!("probability output [{}, 2]", rows),
            actual: format!("{} outputs without a matching tensor", outputs.len()),
        })
    }
}

impl Classifier for OnnxPipeline {
    fn predict(&self, features: &Table) -> Result<Vec<u8>, InferenceError> {
        Ok(self
            .run(features)?
            .iter()
            .map(|p| u8::from(p[1] > 0.5))
            .collect())
    }

    fn predict_proba(&self, features: &Table) -> Result<Vec<Vec<f64>>, InferenceError> {
        self.run(features)
    }

    fn n_features(&self) -> usize {
        self.encoder.n_features()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
