//! Prediction Service

use crate::error::ServiceError;
use crate::input::EmployeeInput;
use crate::outcome::{
    round_to, BatchPrediction, EmployeePrediction, PredictionPage, RiskLevel, SinglePrediction,
};
use crate::MAX_PAGE_SIZE;
use inference_engine::{positive_probability, Classifier};
use metrics::counter;
use reconciler::{Reconciler, Reconciliation};
use record_table::Table;
use std::sync::Arc;
use storage::{NewPrediction, PredictionRecord, PredictionRepository, SourceTables};
use tracing::{debug, info, warn};
use validator::Validate;

/// Classifier output for one row
#[derive(Debug, Clone)]
struct Scored {
    class: u8,
    probability: f64,
    probabilities: Vec<f64>,
}

/// Serves turnover predictions. Cheap to share behind an `Arc`.
pub struct PredictionService {
    classifier: Option<Arc<dyn Classifier>>,
    sources: Arc<dyn SourceTables>,
    repository: Arc<dyn PredictionRepository>,
    reconciler: Reconciler,
}

impl PredictionService {
    /// `classifier` is `None` when the model artifact failed to load; the
    /// service still answers CRUD and health requests in that state.
    pub fn new(
        classifier: Option<Arc<dyn Classifier>>,
        sources: Arc<dyn SourceTables>,
        repository: Arc<dyn PredictionRepository>,
    ) -> Self {
        match &classifier {
            Some(model) => info!("Prediction service ready with model {}", model.name()),
            None => warn!("Prediction service started without a model"),
        }
        Self {
            classifier,
            sources,
            repository,
            reconciler: Reconciler::new(),
        }
    }

    pub fn model_loaded(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn backend_name(&self) -> &'static str {
        self.repository.backend_name()
    }

    fn classifier(&self) -> Result<&dyn Classifier, ServiceError> {
        self.classifier.as_deref().ok_or(ServiceError::Unavailable)
    }

    /// Score every employee present in all three HR extracts
    pub async fn predict_batch(&self) -> Result<BatchPrediction, ServiceError> {
        let result = self.run_batch().await;
        record_outcome("batch", result.as_ref().map(|b| b.total_employees));
        result
    }

    async fn run_batch(&self) -> Result<BatchPrediction, ServiceError> {
        let classifier = self.classifier()?;

        let sources = self.sources.load_sources().await?;
        debug!(
            "Loaded sources: {} SIRH, {} evaluation, {} survey rows",
            sources.sirh.len(),
            sources.evaluation.len(),
            sources.survey.len()
        );

        let matrix = match self
            .reconciler
            .reconcile(&sources.sirh, &sources.evaluation, &sources.survey)?
        {
            Reconciliation::Ready(matrix) => matrix,
            Reconciliation::Empty(reason) => return Err(ServiceError::NoData(reason)),
        };

        let scored = classify(classifier, matrix.table())?;
        let employee_ids = matrix.employee_ids();

        let records = employee_ids
            .iter()
            .zip(&scored)
            .map(|(id, s)| NewPrediction {
                employee_id: Some(*id),
                prediction: s.class,
                probability: s.probability,
                probabilities: s.probabilities.clone(),
            })
            .collect();
        let ids = self.repository.insert_predictions(records).await?;
        debug_assert_eq!(ids.len(), scored.len());

        let predictions = scored
            .iter()
            .zip(employee_ids)
            .zip(ids)
            .enumerate()
            .map(|(index, ((s, employee_id), prediction_id))| EmployeePrediction {
                prediction_id,
                employee_id: *employee_id,
                employee_index: index,
                will_leave: s.class == 1,
                probability: round_to(s.probability, 3),
                risk_level: RiskLevel::from_probability(s.probability),
            })
            .collect();

        let batch = BatchPrediction::new(predictions);
        info!(
            "Batch prediction: {} employees, {} high risk ({}%)",
            batch.total_employees, batch.statistics.high_risk, batch.statistics.high_risk_percentage
        );
        Ok(batch)
    }

    /// Score one posted employee
    pub async fn predict_one(&self, input: EmployeeInput) -> Result<SinglePrediction, ServiceError> {
        let result = self.run_one(input).await;
        record_outcome("single", result.as_ref().map(|_| 1));
        result
    }

    async fn run_one(&self, input: EmployeeInput) -> Result<SinglePrediction, ServiceError> {
        let classifier = self.classifier()?;
        input.validate()?;

        let table = input
            .to_table()
            .map_err(|e| ServiceError::MalformedInput(e.to_string()))?;
        let scored = classify(classifier, &table)?;
        let Some(first) = scored.into_iter().next() else {
            return Err(ServiceError::Inference("classifier returned no rows".to_string()));
        };

        let ids = self
            .repository
            .insert_predictions(vec![NewPrediction {
                employee_id: input.employee_id,
                prediction: first.class,
                probability: first.probability,
                probabilities: first.probabilities,
            }])
            .await?;
        let Some(&prediction_id) = ids.first() else {
            return Err(ServiceError::Persistence("no prediction id returned".to_string()));
        };

        debug!(
            "Single prediction {}: p = {:.4}",
            prediction_id, first.probability
        );
        Ok(SinglePrediction {
            prediction_id,
            will_leave: first.class == 1,
            probability: round_to(first.probability, 3),
            risk_level: RiskLevel::from_probability(first.probability),
        })
    }

    /// Page of stored predictions ordered by id; `limit` is capped
    pub async fn list_predictions(
        &self,
        skip: i64,
        limit: i64,
    ) -> Result<PredictionPage, ServiceError> {
        let skip = skip.max(0);
        let limit = limit.clamp(0, MAX_PAGE_SIZE);
        let predictions = self.repository.list_predictions(skip, limit).await?;
        let total = self.repository.count_predictions().await?;
        Ok(PredictionPage {
            total,
            skip,
            limit,
            predictions,
        })
    }

    pub async fn get_prediction(&self, id: i64) -> Result<PredictionRecord, ServiceError> {
        self.repository
            .get_prediction(id)
            .await?
            .ok_or(ServiceError::NotFound(id))
    }

    pub async fn delete_prediction(&self, id: i64) -> Result<(), ServiceError> {
        if self.repository.delete_prediction(id).await? {
            info!("Deleted prediction {}", id);
            Ok(())
        } else {
            Err(ServiceError::NotFound(id))
        }
    }
}

/// Run both classifier calls and check they line up with the input rows
fn classify(classifier: &dyn Classifier, table: &Table) -> Result<Vec<Scored>, ServiceError> {
    let classes = classifier.predict(table)?;
    let probabilities = classifier.predict_proba(table)?;

    if classes.len() != table.len() || probabilities.len() != table.len() {
        return Err(ServiceError::Inference(format!(
            "classifier returned {} classes and {} probability rows for {} inputs",
            classes.len(),
            probabilities.len(),
            table.len()
        )));
    }

    classes
        .into_iter()
        .zip(probabilities)
        .map(|(class, probabilities)| {
            let probability = positive_probability(&probabilities)?;
            if !(0.0..=1.0).contains(&probability) {
                return Err(ServiceError::Inference(format!(
                    "probability {} outside [0, 1]",
                    probability
                )));
            }
            Ok(Scored {
                class,
                probability,
                probabilities,
            })
        })
        .collect()
}

fn record_outcome(mode: &'static str, result: Result<usize, &ServiceError>) {
    match result {
        Ok(count) => counter!("turnover_predictions_total", "mode" => mode).increment(count as u64),
        Err(err) => {
            warn!("{} prediction failed: {}", mode, err);
            counter!("turnover_prediction_failures_total", "kind" => err.kind().as_str())
                .increment(1);
        }
    }
}
