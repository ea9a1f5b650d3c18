//! Index, health and metrics routes

use axum::{extract::State, http::header, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
    pub database_backend: &'static str,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Endpoint listing
pub async fn index(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "message": "Employee turnover prediction API",
        "version": state.version,
        "endpoints": {
            "predict": "POST /predict - score every employee in the database",
            "predict_one": "POST /predict_one - score one employee from the request body",
            "predictions": "GET /predictions - list stored predictions (skip, limit)",
            "prediction_by_id": "GET /predictions/{id} - fetch one stored prediction",
            "delete_prediction": "DELETE /predictions/{id} - delete one stored prediction",
            "health": "GET /health - service status",
            "metrics": "GET /metrics - Prometheus metrics",
        }
    }))
}

/// Healthy iff the model is loaded
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let model_loaded = state.service.model_loaded();
    Json(HealthResponse {
        status: if model_loaded { "healthy" } else { "unhealthy" },
        model_loaded,
        database_backend: state.service.backend_name(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

/// Prometheus text exposition
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();
    ([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}
