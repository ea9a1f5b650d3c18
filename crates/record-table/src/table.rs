//! Ordered Table Implementation

use crate::{TableError, Value};
use serde::{Deserialize, Serialize};

/// Row-major table with unique, ordered column names.
///
/// Row order is significant: every operation keeps rows in the order they
/// were pushed, which is what lets callers pair results back to input rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given columns
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Result<Self, TableError> {
        let mut names: Vec<String> = Vec::new();
        for name in columns {
            let name = name.into();
            if names.contains(&name) {
                return Err(TableError::DuplicateColumn(name));
            }
            names.push(name);
        }
        Ok(Self {
            columns: names,
            rows: Vec::new(),
        })
    }

    /// Create a table from columns and rows, checking row widths
    pub fn from_rows<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        rows: Vec<Vec<Value>>,
    ) -> Result<Self, TableError> {
        let mut table = Self::new(columns)?;
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Append a row
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), TableError> {
        if row.len() != self.columns.len() {
            return Err(TableError::RowWidth {
                row: self.rows.len(),
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Column names in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows in order
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Position of a column
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Get a row by position
    pub fn row(&self, index: usize) -> Option<&[Value]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Get a single cell by row position and column name
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Values of one column, top to bottom
    pub fn column(&self, name: &str) -> Result<Vec<&Value>, TableError> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))?;
        Ok(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// Rename columns using `(from, to)` pairs; absent sources are ignored
    pub fn rename(&mut self, mapping: &[(&str, &str)]) -> Result<(), TableError> {
        for (from, to) in mapping {
            if let Some(idx) = self.column_index(from) {
                if from != to && self.has_column(to) {
                    return Err(TableError::DuplicateColumn(to.to_string()));
                }
                self.columns[idx] = to.to_string();
            }
        }
        Ok(())
    }

    /// Set a column, replacing it in place or appending it at the end
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) -> Result<(), TableError> {
        if values.len() != self.rows.len() {
            return Err(TableError::RowWidth {
                row: values.len().min(self.rows.len()),
                expected: self.rows.len(),
                actual: values.len(),
            });
        }
        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(())
    }

    /// Replace every cell of a column with the result of `f(row_index, cell)`
    pub fn try_map_column<F, E>(&mut self, name: &str, mut f: F) -> Result<(), E>
    where
        F: FnMut(usize, &Value) -> Result<Value, E>,
        E: From<TableError>,
    {
        let idx = self
            .column_index(name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))?;
        for (i, row) in self.rows.iter_mut().enumerate() {
            row[idx] = f(i, &row[idx])?;
        }
        Ok(())
    }

    /// Drop the named columns; names that are not present are skipped
    pub fn drop_columns(&mut self, names: &[&str]) {
        let keep: Vec<bool> = self
            .columns
            .iter()
            .map(|c| !names.contains(&c.as_str()))
            .collect();
        if keep.iter().all(|k| *k) {
            return;
        }

        self.columns = self
            .columns
            .drain(..)
            .zip(&keep)
            .filter_map(|(c, k)| k.then_some(c))
            .collect();
        for row in &mut self.rows {
            *row = row
                .drain(..)
                .zip(&keep)
                .filter_map(|(v, k)| k.then_some(v))
                .collect();
        }
    }
}
