//! Stored record types

use chrono::{DateTime, Utc};
use record_table::Table;
use serde::{Deserialize, Serialize};

/// A persisted prediction; never updated after insert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub id: i64,
    pub employee_id: Option<i64>,
    pub prediction: i64,
    /// Probability of the positive ("will leave") class, full precision
    pub probability: f64,
    pub probabilities: Vec<f64>,
    pub created_at: DateTime<Utc>,
}

/// Prediction about to be stored; id and timestamp are assigned on insert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPrediction {
    pub employee_id: Option<i64>,
    pub prediction: u8,
    pub probability: f64,
    pub probabilities: Vec<f64>,
}

impl NewPrediction {
    pub(crate) fn into_record(self, id: i64, created_at: DateTime<Utc>) -> PredictionRecord {
        PredictionRecord {
            id,
            employee_id: self.employee_id,
            prediction: i64::from(self.prediction),
            probability: self.probability,
            probabilities: self.probabilities,
            created_at,
        }
    }
}

/// The three raw HR extracts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceSet {
    pub sirh: Table,
    pub evaluation: Table,
    pub survey: Table,
}
