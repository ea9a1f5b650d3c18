//! Classifier Trait

use crate::InferenceError;
use record_table::Table;

/// Pre-trained binary classifier. Read-only after load, shared across
/// requests. Both methods return one entry per input row, in row order.
pub trait Classifier: Send + Sync {
    /// Predicted class per row (1 = will leave)
    fn predict(&self, features: &Table) -> Result<Vec<u8>, InferenceError>;

    /// Class probability vector per row, `[p(stay), p(leave)]`
    fn predict_proba(&self, features: &Table) -> Result<Vec<Vec<f64>>, InferenceError>;

    /// Width of the encoded input the model consumes
    fn n_features(&self) -> usize;

    /// Human-readable model name
    fn name(&self) -> &str;
}

/// Probability of the positive class from a probability vector
pub fn positive_probability(probabilities: &[f64]) -> Result<f64, InferenceError> {
    probabilities
        .get(1)
        .copied()
        .ok_or_else(|| InferenceError::InvalidInputShape {
            expected: "2 class probabilities".to_string(),
            actual: format!("{} values", probabilities.len()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_probability() {
        assert_eq!(positive_probability(&[0.2, 0.8]).unwrap(), 0.8);
        assert!(positive_probability(&[1.0]).is_err());
    }
}
