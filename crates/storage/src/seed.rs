//! CSV extract loading
//!
//! Extract files are named after their tables (`extrait_sirh.csv`, ...).
//! Column types are inferred over the whole column: INTEGER when every
//! non-empty cell parses as `i64`, REAL when every one parses as `f64`,
//! TEXT otherwise. Empty cells load as NULL.

use crate::records::SourceSet;
use crate::{StorageError, EVALUATION_TABLE, SIRH_TABLE, SURVEY_TABLE};
use record_table::{Table, Value};
use std::path::Path;
use tracing::{info, warn};

/// Storage type of a seeded column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    /// Infer from already-typed cells
    pub fn infer<'a>(cells: impl IntoIterator<Item = &'a Value>) -> Self {
        let mut kind = ColumnType::Integer;
        for cell in cells {
            match cell {
                Value::Null | Value::Int(_) => {}
                Value::Float(_) => kind = ColumnType::Real,
                Value::Text(_) => return ColumnType::Text,
            }
        }
        kind
    }
}

fn infer_raw(cells: &[&str]) -> ColumnType {
    let present = || cells.iter().filter(|c| !c.is_empty());
    if present().all(|c| c.parse::<i64>().is_ok()) {
        ColumnType::Integer
    } else if present().all(|c| c.parse::<f64>().is_ok()) {
        ColumnType::Real
    } else {
        ColumnType::Text
    }
}

fn typed_cell(raw: &str, kind: ColumnType) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    match kind {
        ColumnType::Integer => raw.parse().map(Value::Int).unwrap_or(Value::Null),
        ColumnType::Real => raw.parse().map(Value::Float).unwrap_or(Value::Null),
        ColumnType::Text => Value::Text(raw.to_string()),
    }
}

/// Read one CSV file with a header row into a typed table
pub fn read_csv_table(path: &Path) -> Result<Table, StorageError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_path(path)?;

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut raw_rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        raw_rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    let kinds: Vec<ColumnType> = (0..columns.len())
        .map(|j| {
            let cells: Vec<&str> = raw_rows
                .iter()
                .map(|r| r.get(j).map(String::as_str).unwrap_or(""))
                .collect();
            infer_raw(&cells)
        })
        .collect();

    let rows = raw_rows
        .iter()
        .map(|raw| {
            kinds
                .iter()
                .enumerate()
                .map(|(j, kind)| typed_cell(raw.get(j).map(String::as_str).unwrap_or(""), *kind))
                .collect()
        })
        .collect();

    Table::from_rows(columns, rows).map_err(|e| StorageError::CsvError(e.to_string()))
}

/// Read every extract present in `dir`, keyed by table name.
/// Missing files are skipped with a warning.
pub(crate) fn read_extracts(dir: &Path) -> Result<Vec<(&'static str, Table)>, StorageError> {
    let mut extracts = Vec::with_capacity(3);
    for name in [SIRH_TABLE, EVALUATION_TABLE, SURVEY_TABLE] {
        let path = dir.join(format!("{}.csv", name));
        if !path.exists() {
            warn!("Extract {} not found, skipping", path.display());
            continue;
        }
        let table = read_csv_table(&path)?;
        info!(
            "Read {} rows x {} columns from {}",
            table.len(),
            table.width(),
            path.display()
        );
        extracts.push((name, table));
    }
    Ok(extracts)
}

/// Load the three extracts from CSV; a missing file yields an empty table
pub fn load_csv_sources(dir: &Path) -> Result<SourceSet, StorageError> {
    let mut sources = SourceSet::default();
    for (name, table) in read_extracts(dir)? {
        match name {
            SIRH_TABLE => sources.sirh = table,
            EVALUATION_TABLE => sources.evaluation = table,
            _ => sources.survey = table,
        }
    }
    Ok(sources)
}
