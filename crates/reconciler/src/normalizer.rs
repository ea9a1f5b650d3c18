//! Cell Normalization for percentages and Oui/Non flags

use crate::ReconcileError;
use once_cell::sync::Lazy;
use record_table::Value;
use regex::Regex;

static PERCENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(-?[0-9]+(?:\.[0-9]+)?)\s*%\s*$").expect("valid percent regex")
});

/// Normalize a salary increase cell to a fraction.
///
/// Numbers and nulls pass through unchanged; `"15 %"` and `"15%"` become
/// `0.15`; any other text is rejected.
pub fn normalize_percentage(row: usize, value: &Value) -> Result<Value, ReconcileError> {
    match value {
        Value::Text(text) => {
            let malformed = || ReconcileError::MalformedPercentage {
                row,
                value: text.clone(),
            };
            let caps = PERCENT.captures(text).ok_or_else(malformed)?;
            let number: f64 = caps[1].parse().map_err(|_| malformed())?;
            Ok(Value::Float(number / 100.0))
        }
        other => Ok(other.clone()),
    }
}

/// `"Oui"` and `"Y"` map to 1, everything else to 0
pub fn normalize_flag(value: &Value) -> Value {
    match value.as_str() {
        Some("Oui") | Some("Y") => Value::Int(1),
        _ => Value::Int(0),
    }
}
