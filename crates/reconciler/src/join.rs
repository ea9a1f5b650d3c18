//! Inner Join on precomputed employee keys

use record_table::{Table, TableError, Value};
use std::collections::HashMap;

/// Inner join `left` and `right` on row-aligned integer keys.
///
/// Output rows follow left order, then the order of matching right rows.
/// The key column (`key_name`) is written once, taken from the left side.
/// Other column names present on both sides get `_x` / `_y` suffixes.
/// Returns the joined table together with its row-aligned keys.
pub fn inner_join(
    left: &Table,
    left_keys: &[i64],
    right: &Table,
    right_keys: &[i64],
    key_name: &str,
) -> Result<(Table, Vec<i64>), TableError> {
    let right_key_idx = right.column_index(key_name);

    let mut right_index: HashMap<i64, Vec<usize>> = HashMap::new();
    for (row, key) in right_keys.iter().enumerate() {
        right_index.entry(*key).or_default().push(row);
    }

    let right_columns: Vec<usize> = (0..right.width())
        .filter(|idx| Some(*idx) != right_key_idx)
        .collect();

    let overlaps = |name: &str| -> bool {
        name != key_name
            && left.has_column(name)
            && right_columns
                .iter()
                .any(|idx| right.columns()[*idx] == name)
    };

    let mut columns: Vec<String> = left
        .columns()
        .iter()
        .map(|c| if overlaps(c) { format!("{}_x", c) } else { c.clone() })
        .collect();
    columns.extend(right_columns.iter().map(|idx| {
        let name = &right.columns()[*idx];
        if overlaps(name) {
            format!("{}_y", name)
        } else {
            name.clone()
        }
    }));

    let mut joined = Table::new(columns)?;
    let mut keys = Vec::new();

    for (left_row, key) in left.rows().iter().zip(left_keys) {
        let Some(matches) = right_index.get(key) else {
            continue;
        };
        for right_row in matches {
            let source = &right.rows()[*right_row];
            let mut row: Vec<Value> = left_row.clone();
            row.extend(right_columns.iter().map(|idx| source[*idx].clone()));
            joined.push_row(row)?;
            keys.push(*key);
        }
    }

    Ok((joined, keys))
}
