//! Prediction Routes

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use predictor::{
    BatchPrediction, EmployeeInput, PredictionPage, RiskLevel, SinglePrediction,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storage::PredictionRecord;

use crate::error::ApiResult;
use crate::AppState;

/// Successful response envelope
#[derive(Debug, Serialize)]
pub struct Success<T> {
    pub success: bool,
    #[serde(flatten)]
    pub body: T,
}

impl<T> Success<T> {
    fn new(body: T) -> Json<Self> {
        Json(Self {
            success: true,
            body,
        })
    }
}

/// Query parameters for the listing endpoint
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

#[derive(Debug, Serialize)]
pub struct SingleBody {
    pub prediction_id: i64,
    pub prediction: SingleOutcome,
}

#[derive(Debug, Serialize)]
pub struct SingleOutcome {
    pub will_leave: bool,
    pub probability: f64,
    pub risk_level: RiskLevel,
}

impl From<SinglePrediction> for SingleBody {
    fn from(p: SinglePrediction) -> Self {
        Self {
            prediction_id: p.prediction_id,
            prediction: SingleOutcome {
                will_leave: p.will_leave,
                probability: p.probability,
                risk_level: p.risk_level,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecordBody {
    pub prediction: PredictionRecord,
}

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

/// Score every employee in the HR extracts
pub async fn predict_all(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Success<BatchPrediction>>> {
    let batch = state.service.predict_batch().await?;
    Ok(Success::new(batch))
}

/// Score one posted employee
pub async fn predict_one(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EmployeeInput>, JsonRejection>,
) -> ApiResult<Json<Success<SingleBody>>> {
    let Json(input) = payload?;
    let result = state.service.predict_one(input).await?;
    Ok(Success::new(result.into()))
}

/// Page through stored predictions
pub async fn list_predictions(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Success<PredictionPage>>> {
    let Query(params) = params?;
    let page = state
        .service
        .list_predictions(params.skip, params.limit)
        .await?;
    Ok(Success::new(page))
}

pub async fn get_prediction(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Success<RecordBody>>> {
    let Path(id) = id?;
    let prediction = state.service.get_prediction(id).await?;
    Ok(Success::new(RecordBody { prediction }))
}

pub async fn delete_prediction(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Success<MessageBody>>> {
    let Path(id) = id?;
    state.service.delete_prediction(id).await?;
    Ok(Success::new(MessageBody {
        message: format!("Prediction {} deleted", id),
    }))
}
