//! Service Error Types

use inference_engine::InferenceError;
use reconciler::{EmptyReason, ReconcileError};
use serde::{Deserialize, Serialize};
use storage::StorageError;
use thiserror::Error;

/// Failures of the prediction service
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    #[error("Model is not loaded, check that the model artifact exists")]
    Unavailable,

    #[error("No data after preprocessing: {0}")]
    NoData(EmptyReason),

    #[error("Malformed identifier: {0}")]
    MalformedIdentifier(String),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Persistence failed: {0}")]
    Persistence(String),

    #[error("Prediction with id {0} not found")]
    NotFound(i64),
}

/// Classification tag carried in failure bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Unavailable,
    NoData,
    MalformedIdentifier,
    MalformedInput,
    ValidationError,
    InferenceError,
    PersistenceError,
    NotFound,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unavailable => "Unavailable",
            ErrorKind::NoData => "NoData",
            ErrorKind::MalformedIdentifier => "MalformedIdentifier",
            ErrorKind::MalformedInput => "MalformedInput",
            ErrorKind::ValidationError => "ValidationError",
            ErrorKind::InferenceError => "InferenceError",
            ErrorKind::PersistenceError => "PersistenceError",
            ErrorKind::NotFound => "NotFound",
        }
    }
}

/// Structured failure body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    pub success: bool,
    pub error: String,
    pub error_type: ErrorKind,
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Unavailable => ErrorKind::Unavailable,
            ServiceError::NoData(_) => ErrorKind::NoData,
            ServiceError::MalformedIdentifier(_) => ErrorKind::MalformedIdentifier,
            ServiceError::MalformedInput(_) => ErrorKind::MalformedInput,
            ServiceError::Validation(_) => ErrorKind::ValidationError,
            ServiceError::Inference(_) => ErrorKind::InferenceError,
            ServiceError::Persistence(_) => ErrorKind::PersistenceError,
            ServiceError::NotFound(_) => ErrorKind::NotFound,
        }
    }

    pub fn to_failure(&self) -> Failure {
        Failure {
            success: false,
            error: self.to_string(),
            error_type: self.kind(),
        }
    }
}

impl From<ReconcileError> for ServiceError {
    fn from(err: ReconcileError) -> Self {
        match err {
            ReconcileError::MalformedIdentifier { .. } | ReconcileError::MissingKeyColumn { .. } => {
                ServiceError::MalformedIdentifier(err.to_string())
            }
            other => ServiceError::MalformedInput(other.to_string()),
        }
    }
}

impl From<InferenceError> for ServiceError {
    fn from(err: InferenceError) -> Self {
        ServiceError::Inference(err.to_string())
    }
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Persistence(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::Validation(err.to_string())
    }
}
