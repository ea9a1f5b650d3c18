//! Turnover Inference Engine
//!
//! Defines the [`Classifier`] seam consumed by the prediction service and the
//! model artifacts that implement it.

mod classifier;
mod encoder;
mod linear;
mod loader;
mod onnx;

pub use classifier::{positive_probability, Classifier};
pub use encoder::{CategoricalFeature, FeatureEncoder, SafeLogTransform, StandardScaler};
pub use linear::LinearPipeline;
pub use loader::load_classifier;
pub use onnx::OnnxPipeline;

use thiserror::Error;

/// Errors during model loading or inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
    #[error("Invalid input: column {column}, row {row}: {reason}")]
    InvalidInput {
        column: String,
        row: usize,
        reason: String,
    },
}
