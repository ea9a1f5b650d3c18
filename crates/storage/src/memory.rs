//! In-memory backend

use crate::records::{NewPrediction, PredictionRecord, SourceSet};
use crate::{PredictionRepository, SourceTables, StorageError};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

#[derive(Debug)]
struct PredictionLog {
    records: Vec<PredictionRecord>,
    next_id: i64,
}

/// Process-local repository, used for tests and demo runs without a database
#[derive(Debug)]
pub struct InMemoryRepository {
    sources: Mutex<SourceSet>,
    predictions: Mutex<PredictionLog>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    mutex
        .lock()
        .map_err(|e| StorageError::DatabaseError(format!("Lock error: {}", e)))
}

impl InMemoryRepository {
    pub fn new() -> Self {
        info!("Creating in-memory repository");
        Self {
            sources: Mutex::new(SourceSet::default()),
            predictions: Mutex::new(PredictionLog {
                records: Vec::with_capacity(1000),
                next_id: 1,
            }),
        }
    }

    pub fn with_sources(sources: SourceSet) -> Self {
        Self {
            sources: Mutex::new(sources),
            ..Self::new()
        }
    }

    /// Number of stored predictions
    pub fn prediction_count(&self) -> usize {
        self.predictions.lock().map(|p| p.records.len()).unwrap_or(0)
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceTables for InMemoryRepository {
    async fn load_sources(&self) -> Result<SourceSet, StorageError> {
        Ok(lock(&self.sources)?.clone())
    }
}

#[async_trait]
impl PredictionRepository for InMemoryRepository {
    async fn init_schema(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn insert_predictions(
        &self,
        records: Vec<NewPrediction>,
    ) -> Result<Vec<i64>, StorageError> {
        // One lock for the whole batch keeps the insert all-or-nothing
        let mut log = lock(&self.predictions)?;
        let created_at = Utc::now();
        let mut ids = Vec::with_capacity(records.len());

        for record in records {
            let id = log.next_id;
            log.next_id += 1;
            log.records.push(record.into_record(id, created_at));
            ids.push(id);
        }

        debug!("Inserted {} predictions", ids.len());
        Ok(ids)
    }

    async fn get_prediction(&self, id: i64) -> Result<Option<PredictionRecord>, StorageError> {
        let log = lock(&self.predictions)?;
        Ok(log.records.iter().find(|r| r.id == id).cloned())
    }

    async fn list_predictions(
        &self,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<PredictionRecord>, StorageError> {
        let log = lock(&self.predictions)?;
        Ok(log
            .records
            .iter()
            .skip(skip.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn count_predictions(&self) -> Result<i64, StorageError> {
        Ok(lock(&self.predictions)?.records.len() as i64)
    }

    async fn delete_prediction(&self, id: i64) -> Result<bool, StorageError> {
        let mut log = lock(&self.predictions)?;
        let before = log.records.len();
        log.records.retain(|r| r.id != id);
        Ok(log.records.len() != before)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
