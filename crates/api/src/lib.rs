//! Turnover Prediction API Server
//!
//! HTTP surface over the prediction service, plus the wiring that builds it
//! from configuration: storage backend, model artifact, metrics recorder.

use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use predictor::PredictionService;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use storage::{InMemoryRepository, PredictionRepository, SourceTables, SqlRepository};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

pub mod config;
pub mod error;
mod routes;

use crate::config::{LoggingConfig, Settings};

/// Application state shared across handlers
pub struct AppState {
    pub service: PredictionService,
    pub version: String,
    pub start_time: Instant,
    /// Absent when another recorder is already installed (tests)
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(service: PredictionService, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            service,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
            metrics,
        }
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::system::index))
        .route("/health", get(routes::system::health))
        .route("/metrics", get(routes::system::metrics))
        .route("/predict", post(routes::predictions::predict_all))
        .route("/predict_one", post(routes::predictions::predict_one))
        .route("/predictions", get(routes::predictions::list_predictions))
        .route(
            "/predictions/:id",
            get(routes::predictions::get_prediction).delete(routes::predictions::delete_prediction),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) {
    let level = config.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    let result = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    if let Err(err) = result {
        eprintln!("Logging already initialised: {}", err);
    }
}

/// Install the Prometheus recorder; `None` if one is already installed
pub fn install_metrics() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(err) => {
            warn!("Metrics recorder not installed: {}", err);
            None
        }
    }
}

/// Storage backend behind both storage traits
pub struct Repositories {
    pub sources: Arc<dyn SourceTables>,
    pub predictions: Arc<dyn PredictionRepository>,
}

/// Connect the configured backend and make sure the schema exists.
/// With `seed_dir`, source tables are (re)loaded from CSV first.
pub async fn open_repositories(
    url: &str,
    seed_dir: Option<&Path>,
) -> anyhow::Result<Repositories> {
    if url == "memory" {
        let repo = match seed_dir {
            Some(dir) => Arc::new(InMemoryRepository::with_sources(
                storage::load_csv_sources(dir)?,
            )),
            None => Arc::new(InMemoryRepository::new()),
        };
        return Ok(Repositories {
            sources: repo.clone(),
            predictions: repo,
        });
    }

    let repo = Arc::new(SqlRepository::connect(url).await?);
    repo.init_schema().await?;
    if let Some(dir) = seed_dir {
        let seeded = repo.seed_from_csv(dir).await?;
        info!("Seeded {} source tables from {}", seeded, dir.display());
    }
    Ok(Repositories {
        sources: repo.clone(),
        predictions: repo,
    })
}

/// Build the prediction service from settings. A model that fails to load
/// is logged and the service runs without one.
pub async fn build_service(settings: &Settings) -> anyhow::Result<PredictionService> {
    let url = settings.database.resolve_url();
    let seed_dir = settings
        .seed
        .enabled
        .then_some(settings.seed.data_dir.as_path());
    let repos = open_repositories(&url, seed_dir).await?;

    let classifier = match inference_engine::load_classifier(&settings.model.path) {
        Ok(model) => Some(model),
        Err(err) => {
            warn!("Model not loaded from {}: {}", settings.model.path.display(), err);
            None
        }
    };

    Ok(PredictionService::new(
        classifier,
        repos.sources,
        repos.predictions,
    ))
}

/// Run the server until shutdown
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let metrics = install_metrics();
    let service = build_service(&settings).await?;
    let state = Arc::new(AppState::new(service, metrics));
    let app = create_router(state);

    let addr = settings.bind_address();
    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
