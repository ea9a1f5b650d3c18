//! Employee Id Extraction
//!
//! Evaluation and survey rows only carry the employee id embedded in a
//! code such as `E_42` or `00000042`. The id is the first contiguous run of
//! ASCII digits. Stripping a literal `00000` prefix from survey codes is
//! deprecated: it corrupts ids that genuinely contain that sequence.
//!
//! SIRH rows carry the id itself, so they are parsed strictly.

use crate::{ReconcileError, SourceKind};
use once_cell::sync::Lazy;
use record_table::{Table, Value};
use regex::Regex;

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new("[0-9]+").expect("valid digit regex"));

/// First contiguous digit run of the cell's string form
pub fn extract_employee_id(value: &Value) -> Option<i64> {
    if value.is_null() {
        return None;
    }
    let text = value.to_string();
    DIGIT_RUN
        .find(&text)
        .and_then(|m| m.as_str().parse::<i64>().ok())
}

/// Integer id or integer-valued text; anything else is rejected
pub fn parse_employee_id(value: &Value) -> Option<i64> {
    match value {
        Value::Text(text) => text.trim().parse::<i64>().ok(),
        other => other.as_i64(),
    }
}

/// Extract one id per row from an embedded code in `column`
pub fn key_column(
    table: &Table,
    source: SourceKind,
    column: &'static str,
) -> Result<Vec<i64>, ReconcileError> {
    keys_with(table, source, column, extract_employee_id)
}

/// Read one integer id per row from `column` without digit extraction
pub fn strict_key_column(
    table: &Table,
    source: SourceKind,
    column: &'static str,
) -> Result<Vec<i64>, ReconcileError> {
    keys_with(table, source, column, parse_employee_id)
}

fn keys_with(
    table: &Table,
    source: SourceKind,
    column: &'static str,
    parse: fn(&Value) -> Option<i64>,
) -> Result<Vec<i64>, ReconcileError> {
    let cells = table
        .column(column)
        .map_err(|_| ReconcileError::MissingKeyColumn { table: source, column })?;

    cells
        .into_iter()
        .enumerate()
        .map(|(row, cell)| {
            parse(cell).ok_or_else(|| ReconcileError::MalformedIdentifier {
                table: source,
                column,
                row,
                value: cell.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_codes() {
        assert_eq!(extract_employee_id(&Value::from("E_42")), Some(42));
        assert_eq!(extract_employee_id(&Value::from("eval_1")), Some(1));
        assert_eq!(extract_employee_id(&Value::from("abc123def456")), Some(123));
    }

    #[test]
    fn test_genuine_zeros_survive() {
        // "0000010" used to become "10" under suffix stripping; "0000100000"
        // became "1". The digit run keeps the numeric value intact.
        assert_eq!(extract_employee_id(&Value::from("0000010")), Some(10));
        assert_eq!(extract_employee_id(&Value::from("0000100000")), Some(100_000));
    }

    #[test]
    fn test_numeric_cells() {
        assert_eq!(extract_employee_id(&Value::Int(7)), Some(7));
    }

    #[test]
    fn test_no_digits() {
        assert_eq!(extract_employee_id(&Value::from("no-id")), None);
        assert_eq!(extract_employee_id(&Value::Null), None);
        assert_eq!(
            extract_employee_id(&Value::from("99999999999999999999999")),
            None
        );
    }

    #[test]
    fn test_key_column_reports_row() {
        let table = Table::from_rows(
            ["code_sondage"],
            vec![vec![Value::from("S1")], vec![Value::from("S-")]],
        )
        .unwrap();
        let err = key_column(&table, SourceKind::Survey, "code_sondage").unwrap_err();
        assert_eq!(
            err,
            ReconcileError::MalformedIdentifier {
                table: SourceKind::Survey,
                column: "code_sondage",
                row: 1,
                value: "S-".to_string(),
            }
        );
    }

    #[test]
    fn test_strict_ids() {
        assert_eq!(parse_employee_id(&Value::Int(3)), Some(3));
        assert_eq!(parse_employee_id(&Value::from(" 12 ")), Some(12));
        assert_eq!(parse_employee_id(&Value::Float(4.0)), Some(4));
        assert_eq!(parse_employee_id(&Value::Float(3.7)), None);
        assert_eq!(parse_employee_id(&Value::from("abc3xyz")), None);
        assert_eq!(parse_employee_id(&Value::Null), None);
    }

    #[test]
    fn test_strict_key_column_reports_row() {
        let table = Table::from_rows(
            ["id_employee"],
            vec![vec![Value::Int(1)], vec![Value::from("E_2")]],
        )
        .unwrap();
        let err = strict_key_column(&table, SourceKind::Sirh, "id_employee").unwrap_err();
        assert_eq!(
            err,
            ReconcileError::MalformedIdentifier {
                table: SourceKind::Sirh,
                column: "id_employee",
                row: 1,
                value: "E_2".to_string(),
            }
        );
    }

    #[test]
    fn test_key_column_missing() {
        let table = Table::from_rows(["other"], vec![vec![Value::Int(1)]]).unwrap();
        assert!(matches!(
            key_column(&table, SourceKind::Evaluation, "eval_number"),
            Err(ReconcileError::MissingKeyColumn { .. })
        ));
    }
}
