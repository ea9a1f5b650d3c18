//! Turnover Prediction Service
//!
//! Glues the reconciler, the classifier and the persistence gateway into the
//! two prediction operations (whole workforce and single employee) plus
//! read/delete access to stored predictions.

mod error;
mod input;
mod outcome;
mod service;

pub use error::{ErrorKind, Failure, ServiceError};
pub use input::EmployeeInput;
pub use outcome::{
    round_to, BatchPrediction, EmployeePrediction, PredictionPage, RiskLevel, RiskStatistics,
    SinglePrediction,
};
pub use service::PredictionService;

/// Largest page served by [`PredictionService::list_predictions`]
pub const MAX_PAGE_SIZE: i64 = 1000;
