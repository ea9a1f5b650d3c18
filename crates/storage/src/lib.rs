//! Storage Layer
//!
//! Persistence gateway for the turnover service: read access to the three
//! HR extracts and CRUD over stored predictions. Backends are picked at
//! construction time behind the [`SourceTables`] and
//! [`PredictionRepository`] traits.

mod memory;
mod records;
mod seed;
mod sql;

pub use memory::InMemoryRepository;
pub use records::{NewPrediction, PredictionRecord, SourceSet};
pub use seed::{load_csv_sources, read_csv_table, ColumnType};
pub use sql::{Backend, SqlRepository};

use async_trait::async_trait;
use thiserror::Error;

/// SIRH extract table
pub const SIRH_TABLE: &str = "extrait_sirh";
/// Evaluation extract table
pub const EVALUATION_TABLE: &str = "extrait_eval";
/// Survey extract table
pub const SURVEY_TABLE: &str = "extrait_sondage";
/// Stored predictions
pub const PREDICTIONS_TABLE: &str = "predictions";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Batch stored {stored} of {expected} predictions")]
    IncompleteBatch { stored: usize, expected: usize },
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("CSV error: {0}")]
    CsvError(String),
    #[error("Unsupported database URL: {0}")]
    UnsupportedBackend(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::SerializationError(err.to_string())
    }
}

impl From<csv::Error> for StorageError {
    fn from(err: csv::Error) -> Self {
        StorageError::CsvError(err.to_string())
    }
}

/// Read access to the raw HR extracts
#[async_trait]
pub trait SourceTables: Send + Sync {
    /// Load SIRH, evaluation and survey tables; a missing table loads empty
    async fn load_sources(&self) -> Result<SourceSet, StorageError>;
}

/// Prediction persistence
#[async_trait]
pub trait PredictionRepository: Send + Sync {
    /// Create the predictions table if needed
    async fn init_schema(&self) -> Result<(), StorageError>;

    /// Insert all records atomically; exactly one id per record is returned
    /// in input order, or an error with nothing committed
    async fn insert_predictions(
        &self,
        records: Vec<NewPrediction>,
    ) -> Result<Vec<i64>, StorageError>;

    async fn get_prediction(&self, id: i64) -> Result<Option<PredictionRecord>, StorageError>;

    /// Page of predictions ordered by id
    async fn list_predictions(
        &self,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<PredictionRecord>, StorageError>;

    async fn count_predictions(&self) -> Result<i64, StorageError>;

    /// Returns false when no record had this id
    async fn delete_prediction(&self, id: i64) -> Result<bool, StorageError>;

    /// Short backend label for health reporting
    fn backend_name(&self) -> &'static str;
}
