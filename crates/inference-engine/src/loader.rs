//! Artifact loading by file extension

use crate::classifier::Classifier;
use crate::linear::LinearPipeline;
use crate::onnx::OnnxPipeline;
use crate::InferenceError;
use std::path::Path;
use std::sync::Arc;

/// Load a classifier artifact: `.json` linear pipeline or `.onnx` model
pub fn load_classifier(path: &Path) -> Result<Arc<dyn Classifier>, InferenceError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(Arc::new(LinearPipeline::load(path)?)),
        Some("onnx") => Ok(Arc::new(OnnxPipeline::load(path)?)),
        other => Err(InferenceError::ModelLoadError(format!(
            "unsupported model format {:?} for {}",
            other.unwrap_or(""),
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_extension() {
        let err = load_classifier(Path::new("model/full_pipeline.joblib"))
            .err()
            .expect("joblib is not loadable");
        assert!(err.to_string().contains("unsupported model format"));
    }

    #[test]
    fn test_json_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(
            &path,
            r#"{"name":"m","encoder":{"numeric":["age"]},"coefficients":[0.1],"intercept":0.0}"#,
        )
        .unwrap();
        let model = load_classifier(&path).unwrap();
        assert_eq!(model.name(), "m");
    }
}
