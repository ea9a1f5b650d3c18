//! SQL backend over sqlx's `Any` driver (SQLite or PostgreSQL)

use crate::records::{NewPrediction, PredictionRecord, SourceSet};
use crate::seed::{read_extracts, ColumnType};
use crate::{
    PredictionRepository, SourceTables, StorageError, EVALUATION_TABLE, PREDICTIONS_TABLE,
    SIRH_TABLE, SURVEY_TABLE,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use record_table::{Table, Value};
use sqlx::any::{AnyPoolOptions, AnyRow};
use sqlx::{AnyPool, Column, Row};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Database flavour behind the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
    Postgres,
}

impl Backend {
    pub fn from_url(url: &str) -> Result<Self, StorageError> {
        if url.starts_with("sqlite:") {
            Ok(Backend::Sqlite)
        } else if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(Backend::Postgres)
        } else {
            Err(StorageError::UnsupportedBackend(url.to_string()))
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Sqlite => "sqlite",
            Backend::Postgres => "postgresql",
        }
    }

    /// Bind placeholder for the `n`th parameter (1-based)
    fn placeholder(&self, n: usize) -> String {
        match self {
            Backend::Sqlite => "?".to_string(),
            Backend::Postgres => format!("${}", n),
        }
    }

    fn column_type(&self, kind: ColumnType) -> &'static str {
        match (self, kind) {
            (Backend::Sqlite, ColumnType::Integer) => "INTEGER",
            (Backend::Postgres, ColumnType::Integer) => "BIGINT",
            (_, ColumnType::Real) => "DOUBLE PRECISION",
            (_, ColumnType::Text) => "TEXT",
        }
    }

    fn predictions_ddl(&self) -> String {
        let id = match self {
            Backend::Sqlite => "INTEGER PRIMARY KEY AUTOINCREMENT",
            Backend::Postgres => "BIGSERIAL PRIMARY KEY",
        };
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\
             id {}, \
             employee_id BIGINT, \
             prediction BIGINT NOT NULL, \
             probability DOUBLE PRECISION NOT NULL, \
             probabilities TEXT NOT NULL, \
             created_at TEXT NOT NULL)",
            PREDICTIONS_TABLE, id
        )
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Repository backed by a relational database
#[derive(Debug, Clone)]
pub struct SqlRepository {
    pool: AnyPool,
    backend: Backend,
}

impl SqlRepository {
    /// Connect to `url` (`sqlite:...` or `postgres://...`)
    pub async fn connect(url: &str) -> Result<Self, StorageError> {
        sqlx::any::install_default_drivers();
        let backend = Backend::from_url(url)?;

        // Every connection to an in-memory SQLite database is a fresh database
        let max_connections = match backend {
            Backend::Sqlite if url.contains(":memory:") => 1,
            _ => 5,
        };

        let pool = AnyPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect(url)
            .await?;

        info!("Connected to {} database", backend.as_str());
        Ok(Self { pool, backend })
    }

    async fn table_exists(&self, name: &str) -> Result<bool, StorageError> {
        let sql = match self.backend {
            Backend::Sqlite => {
                "SELECT COUNT(*) AS n FROM sqlite_master WHERE type = 'table' AND name = ?"
            }
            Backend::Postgres => {
                "SELECT COUNT(*) AS n FROM information_schema.tables WHERE table_name = $1"
            }
        };
        let row = sqlx::query(sql).bind(name).fetch_one(&self.pool).await?;
        Ok(row.try_get::<i64, _>("n")? > 0)
    }

    async fn load_table(&self, name: &str) -> Result<Table, StorageError> {
        if !self.table_exists(name).await? {
            warn!("Source table {} does not exist, treating as empty", name);
            return Ok(Table::default());
        }

        let rows = sqlx::query(&format!("SELECT * FROM {}", quote_ident(name)))
            .fetch_all(&self.pool)
            .await?;

        let Some(first) = rows.first() else {
            return Ok(Table::default());
        };
        let columns: Vec<String> = first.columns().iter().map(|c| c.name().to_string()).collect();
        let width = columns.len();
        let data = rows
            .iter()
            .map(|row| (0..width).map(|i| decode_cell(row, i)).collect())
            .collect();

        let table = Table::from_rows(columns, data)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        debug!("Loaded {} rows from {}", table.len(), name);
        Ok(table)
    }

    /// Drop and recreate `name` with the content of `table`
    pub async fn replace_table(&self, name: &str, table: &Table) -> Result<(), StorageError> {
        let kinds: Vec<ColumnType> = table
            .columns()
            .iter()
            .map(|c| table.column(c).map(ColumnType::infer))
            .collect::<Result<_, _>>()
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        let definitions = table
            .columns()
            .iter()
            .zip(&kinds)
            .map(|(c, k)| format!("{} {}", quote_ident(c), self.backend.column_type(*k)))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=table.width())
            .map(|n| self.backend.placeholder(n))
            .collect::<Vec<_>>()
            .join(", ");
        let insert = format!(
            "INSERT INTO {} VALUES ({})",
            quote_ident(name),
            placeholders
        );

        let mut tx = self.pool.begin().await?;
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", quote_ident(name)))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&format!("CREATE TABLE {} ({})", quote_ident(name), definitions))
            .execute(&mut *tx)
            .await?;

        for row in table.rows() {
            let mut query = sqlx::query(&insert);
            for (value, kind) in row.iter().zip(&kinds) {
                query = match (value, kind) {
                    (Value::Int(v), ColumnType::Real) => query.bind(*v as f64),
                    (Value::Int(v), _) => query.bind(*v),
                    (Value::Float(v), _) => query.bind(*v),
                    (Value::Text(v), _) => query.bind(v.clone()),
                    (Value::Null, ColumnType::Integer) => query.bind(None::<i64>),
                    (Value::Null, ColumnType::Real) => query.bind(None::<f64>),
                    (Value::Null, ColumnType::Text) => query.bind(None::<String>),
                };
            }
            query.execute(&mut *tx).await?;
        }
        tx.commit().await?;

        info!("Seeded {} with {} rows", name, table.len());
        Ok(())
    }

    /// Replace the source tables with the CSV extracts in `dir`.
    /// Nothing is written unless all three extracts are present.
    pub async fn seed_from_csv(&self, dir: &Path) -> Result<usize, StorageError> {
        let extracts = read_extracts(dir)?;
        if extracts.len() < 3 {
            warn!(
                "Only {} of 3 extracts found in {}, source tables left untouched",
                extracts.len(),
                dir.display()
            );
            return Ok(0);
        }
        for (name, table) in &extracts {
            self.replace_table(name, table).await?;
        }
        Ok(extracts.len())
    }
}

fn decode_cell(row: &AnyRow, index: usize) -> Value {
    if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
        return v.map_or(Value::Null, Value::Int);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
        return v.map_or(Value::Null, Value::Float);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(index) {
        return v.map_or(Value::Null, Value::Text);
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(index) {
        return v.map_or(Value::Null, |b| Value::Int(i64::from(b)));
    }
    Value::Null
}

fn decode_prediction(row: &AnyRow) -> Result<PredictionRecord, StorageError> {
    let probabilities: String = row.try_get("probabilities")?;
    let created_at: String = row.try_get("created_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| StorageError::SerializationError(format!("created_at: {}", e)))?
        .with_timezone(&Utc);

    Ok(PredictionRecord {
        id: row.try_get("id")?,
        employee_id: row.try_get("employee_id")?,
        prediction: row.try_get("prediction")?,
        probability: row.try_get("probability")?,
        probabilities: serde_json::from_str(&probabilities)?,
        created_at,
    })
}

const PREDICTION_COLUMNS: &str =
    "id, employee_id, prediction, probability, probabilities, created_at";

#[async_trait]
impl SourceTables for SqlRepository {
    async fn load_sources(&self) -> Result<SourceSet, StorageError> {
        Ok(SourceSet {
            sirh: self.load_table(SIRH_TABLE).await?,
            evaluation: self.load_table(EVALUATION_TABLE).await?,
            survey: self.load_table(SURVEY_TABLE).await?,
        })
    }
}

#[async_trait]
impl PredictionRepository for SqlRepository {
    async fn init_schema(&self) -> Result<(), StorageError> {
        sqlx::query(&self.backend.predictions_ddl())
            .execute(&self.pool)
            .await?;
        debug!("Predictions schema ready");
        Ok(())
    }

    async fn insert_predictions(
        &self,
        records: Vec<NewPrediction>,
    ) -> Result<Vec<i64>, StorageError> {
        let b = self.backend;
        let sql = format!(
            "INSERT INTO {} (employee_id, prediction, probability, probabilities, created_at) \
             VALUES ({}, {}, {}, {}, {}) RETURNING id",
            PREDICTIONS_TABLE,
            b.placeholder(1),
            b.placeholder(2),
            b.placeholder(3),
            b.placeholder(4),
            b.placeholder(5)
        );
        let created_at = Utc::now().to_rfc3339();
        let expected = records.len();

        // Dropping the transaction on error rolls back every row
        let mut tx = self.pool.begin().await?;
        let mut ids = Vec::with_capacity(records.len());
        for record in records {
            let probabilities = serde_json::to_string(&record.probabilities)?;
            let row = sqlx::query(&sql)
                .bind(record.employee_id)
                .bind(i64::from(record.prediction))
                .bind(record.probability)
                .bind(probabilities)
                .bind(created_at.clone())
                .fetch_one(&mut *tx)
                .await?;
            ids.push(row.try_get::<i64, _>("id")?);
        }
        ensure_complete(&ids, expected)?;
        tx.commit().await?;

        debug!("Inserted {} predictions", ids.len());
        Ok(ids)
    }

    async fn get_prediction(&self, id: i64) -> Result<Option<PredictionRecord>, StorageError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = {}",
            PREDICTION_COLUMNS,
            PREDICTIONS_TABLE,
            self.backend.placeholder(1)
        );
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(decode_prediction).transpose()
    }

    async fn list_predictions(
        &self,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<PredictionRecord>, StorageError> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY id LIMIT {} OFFSET {}",
            PREDICTION_COLUMNS,
            PREDICTIONS_TABLE,
            self.backend.placeholder(1),
            self.backend.placeholder(2)
        );
        let rows = sqlx::query(&sql)
            .bind(limit.max(0))
            .bind(skip.max(0))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(decode_prediction).collect()
    }

    async fn count_predictions(&self) -> Result<i64, StorageError> {
        let row = sqlx::query(&format!("SELECT COUNT(*) AS total FROM {}", PREDICTIONS_TABLE))
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get::<i64, _>("total")?)
    }

    async fn delete_prediction(&self, id: i64) -> Result<bool, StorageError> {
        let sql = format!(
            "DELETE FROM {} WHERE id = {}",
            PREDICTIONS_TABLE,
            self.backend.placeholder(1)
        );
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    fn backend_name(&self) -> &'static str {
        self.backend.as_str()
    }
}

fn ensure_complete(ids: &[i64], expected: usize) -> Result<(), StorageError> {
    if ids.len() != expected {
        return Err(StorageError::IncompleteBatch {
            stored: ids.len(),
            expected,
        });
    }
    Ok(())
}
