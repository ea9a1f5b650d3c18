//! Prediction results and risk classification

use serde::{Deserialize, Serialize};
use storage::PredictionRecord;

/// Probability above which an employee is flagged HIGH risk (strict)
pub const HIGH_RISK_THRESHOLD: f64 = 0.50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    High,
    Low,
}

impl RiskLevel {
    pub fn from_probability(probability: f64) -> Self {
        if probability > HIGH_RISK_THRESHOLD {
            RiskLevel::High
        } else {
            RiskLevel::Low
        }
    }
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Prediction for one employee of a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeePrediction {
    pub prediction_id: i64,
    pub employee_id: i64,
    pub employee_index: usize,
    pub will_leave: bool,
    /// Rounded to 3 decimals; the stored record keeps full precision
    pub probability: f64,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskStatistics {
    pub high_risk: usize,
    pub low_risk: usize,
    pub high_risk_percentage: f64,
}

impl RiskStatistics {
    pub fn from_levels<'a>(levels: impl IntoIterator<Item = &'a RiskLevel>) -> Self {
        let (mut high_risk, mut low_risk) = (0, 0);
        for level in levels {
            match level {
                RiskLevel::High => high_risk += 1,
                RiskLevel::Low => low_risk += 1,
            }
        }
        let total = high_risk + low_risk;
        let high_risk_percentage = if total == 0 {
            0.0
        } else {
            round_to(high_risk as f64 / total as f64 * 100.0, 2)
        };
        Self {
            high_risk,
            low_risk,
            high_risk_percentage,
        }
    }
}

/// Result of scoring the whole workforce
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchPrediction {
    pub total_employees: usize,
    pub statistics: RiskStatistics,
    pub predictions: Vec<EmployeePrediction>,
}

impl BatchPrediction {
    pub fn new(predictions: Vec<EmployeePrediction>) -> Self {
        Self {
            total_employees: predictions.len(),
            statistics: RiskStatistics::from_levels(predictions.iter().map(|p| &p.risk_level)),
            predictions,
        }
    }
}

/// Result of scoring a single posted employee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinglePrediction {
    pub prediction_id: i64,
    pub will_leave: bool,
    pub probability: f64,
    pub risk_level: RiskLevel,
}

/// One page of stored predictions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionPage {
    pub total: i64,
    pub skip: i64,
    pub limit: i64,
    pub predictions: Vec<PredictionRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_strict() {
        assert_eq!(RiskLevel::from_probability(0.50), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(0.5000001), RiskLevel::High);
        assert_eq!(RiskLevel::from_probability(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_probability(1.0), RiskLevel::High);
    }

    #[test]
    fn test_risk_level_wire_format() {
        assert_eq!(serde_json::to_string(&RiskLevel::High).unwrap(), "\"HIGH\"");
        assert_eq!(serde_json::to_string(&RiskLevel::Low).unwrap(), "\"LOW\"");
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round_to(0.123456, 3), 0.123);
        assert_eq!(round_to(0.9876, 3), 0.988);
        assert_eq!(round_to(100.0 / 3.0, 2), 33.33);
    }

    #[test]
    fn test_statistics() {
        let stats = RiskStatistics::from_levels(&[RiskLevel::High, RiskLevel::Low]);
        assert_eq!(stats.high_risk, 1);
        assert_eq!(stats.low_risk, 1);
        assert_eq!(stats.high_risk_percentage, 50.0);

        let thirds =
            RiskStatistics::from_levels(&[RiskLevel::High, RiskLevel::Low, RiskLevel::Low]);
        assert_eq!(thirds.high_risk_percentage, 33.33);
    }
}
