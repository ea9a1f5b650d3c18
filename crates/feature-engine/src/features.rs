//! Derived Feature Computation

use crate::FeatureError;
use record_table::{Table, Value};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of synthetic features appended to every record
pub const FEATURE_DIMENSION: usize = 6;

/// Synthetic column names, in the order they are appended
pub const FEATURE_NAMES: [&str; FEATURE_DIMENSION] = [
    "experience_ratio",
    "age_squared",
    "satisfaction_equilibre",
    "experience_ratio_squared",
    "mobilite_ratio",
    "revenu_par_experience",
];

/// Columns the formulas read
pub const INPUT_COLUMNS: [&str; 7] = [
    "age",
    "annees_experience_totale",
    "annees_dans_le_poste_actuel",
    "annees_dans_l_entreprise",
    "revenu_mensuel",
    "satisfaction_employee_nature_travail",
    "satisfaction_employee_equilibre_pro_perso",
];

/// Normalized attributes the derived features depend on
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureInputs {
    pub age: f64,
    pub annees_experience_totale: f64,
    pub annees_dans_le_poste_actuel: f64,
    pub annees_dans_l_entreprise: f64,
    pub revenu_mensuel: f64,
    pub satisfaction_employee_nature_travail: f64,
    pub satisfaction_employee_equilibre_pro_perso: f64,
}

impl FeatureInputs {
    /// Read the inputs from one table row
    pub fn from_row(table: &Table, row: usize) -> Result<Self, FeatureError> {
        let read = |column: &'static str| -> Result<f64, FeatureError> {
            let value = table
                .get(row, column)
                .ok_or(FeatureError::MissingColumn(column))?;
            value.as_f64().ok_or_else(|| FeatureError::NonNumeric {
                row,
                column,
                value: value.to_string(),
            })
        };

        Ok(Self {
            age: read(INPUT_COLUMNS[0])?,
            annees_experience_totale: read(INPUT_COLUMNS[1])?,
            annees_dans_le_poste_actuel: read(INPUT_COLUMNS[2])?,
            annees_dans_l_entreprise: read(INPUT_COLUMNS[3])?,
            revenu_mensuel: read(INPUT_COLUMNS[4])?,
            satisfaction_employee_nature_travail: read(INPUT_COLUMNS[5])?,
            satisfaction_employee_equilibre_pro_perso: read(INPUT_COLUMNS[6])?,
        })
    }
}

/// The six synthetic features of one record
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineeredFeatures {
    pub experience_ratio: f64,
    pub age_squared: f64,
    pub satisfaction_equilibre: f64,
    pub experience_ratio_squared: f64,
    pub mobilite_ratio: f64,
    pub revenu_par_experience: f64,
}

impl EngineeredFeatures {
    /// Compute the features. Denominators are smoothed with `+ 1`, zero is
    /// never special-cased.
    pub fn compute(inputs: &FeatureInputs) -> Self {
        let experience_ratio = inputs.annees_experience_totale / (inputs.age + 1.0);
        Self {
            experience_ratio,
            age_squared: inputs.age.powi(2),
            satisfaction_equilibre: inputs.satisfaction_employee_nature_travail
                * inputs.satisfaction_employee_equilibre_pro_perso,
            experience_ratio_squared: experience_ratio.powi(2),
            mobilite_ratio: inputs.annees_dans_le_poste_actuel
                / (inputs.annees_dans_l_entreprise + 1.0),
            revenu_par_experience: inputs.revenu_mensuel
                / (inputs.annees_experience_totale + 1.0),
        }
    }

    /// Values in `FEATURE_NAMES` order
    pub fn values(&self) -> [f64; FEATURE_DIMENSION] {
        [
            self.experience_ratio,
            self.age_squared,
            self.satisfaction_equilibre,
            self.experience_ratio_squared,
            self.mobilite_ratio,
            self.revenu_par_experience,
        ]
    }

    /// `(name, value)` pairs in append order
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> {
        FEATURE_NAMES.into_iter().zip(self.values())
    }
}

/// Appends engineered columns to tables
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Compute features for every row and append them as new columns
    pub fn append_to_table(&self, table: &mut Table) -> Result<(), FeatureError> {
        let mut columns: Vec<Vec<Value>> = (0..FEATURE_DIMENSION)
            .map(|_| Vec::with_capacity(table.len()))
            .collect();

        for row in 0..table.len() {
            let features = EngineeredFeatures::compute(&FeatureInputs::from_row(table, row)?);
            for (column, value) in columns.iter_mut().zip(features.values()) {
                column.push(Value::Float(value));
            }
        }

        for (name, values) in FEATURE_NAMES.iter().zip(columns) {
            table.set_column(name, values)?;
        }

        debug!(
            "Appended {} engineered features to {} rows",
            FEATURE_DIMENSION,
            table.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn scenario() -> FeatureInputs {
        FeatureInputs {
            age: 30.0,
            annees_experience_totale: 10.0,
            annees_dans_le_poste_actuel: 2.0,
            annees_dans_l_entreprise: 5.0,
            revenu_mensuel: 6000.0,
            satisfaction_employee_nature_travail: 4.0,
            satisfaction_employee_equilibre_pro_perso: 3.0,
        }
    }

    fn table_for(inputs: &[FeatureInputs]) -> Table {
        let rows = inputs
            .iter()
            .map(|i| {
                vec![
                    Value::Float(i.age),
                    Value::Float(i.annees_experience_totale),
                    Value::Float(i.annees_dans_le_poste_actuel),
                    Value::Float(i.annees_dans_l_entreprise),
                    Value::Float(i.revenu_mensuel),
                    Value::Float(i.satisfaction_employee_nature_travail),
                    Value::Float(i.satisfaction_employee_equilibre_pro_perso),
                ]
            })
            .collect();
        Table::from_rows(INPUT_COLUMNS, rows).unwrap()
    }

    #[test]
    fn test_reference_employee() {
        let f = EngineeredFeatures::compute(&scenario());
        assert_eq!(f.age_squared, 900.0);
        assert_eq!(f.satisfaction_equilibre, 12.0);
        assert!((f.experience_ratio - 0.3226).abs() < 1e-4);
        assert!((f.mobilite_ratio - 0.3333).abs() < 1e-4);
        assert!((f.revenu_par_experience - 545.45).abs() < 1e-2);
        assert!((f.experience_ratio_squared - (10.0f64 / 31.0).powi(2)).abs() < 1e-12);
    }

    #[test]
    fn test_zero_denominators_are_smoothed() {
        let f = EngineeredFeatures::compute(&FeatureInputs {
            revenu_mensuel: 3000.0,
            ..Default::default()
        });
        assert_eq!(f.experience_ratio, 0.0);
        assert_eq!(f.mobilite_ratio, 0.0);
        assert_eq!(f.revenu_par_experience, 3000.0);
    }

    #[test]
    fn test_append_matches_single_record() {
        let mut table = table_for(&[scenario()]);
        FeatureExtractor::new().append_to_table(&mut table).unwrap();

        assert_eq!(table.width(), INPUT_COLUMNS.len() + FEATURE_DIMENSION);
        let expected = EngineeredFeatures::compute(&scenario());
        for (name, value) in expected.named() {
            assert_eq!(table.get(0, name), Some(&Value::Float(value)));
        }
    }

    #[test]
    fn test_integer_cells_are_accepted() {
        let mut table = Table::from_rows(
            INPUT_COLUMNS,
            vec![vec![
                Value::Int(30),
                Value::Int(10),
                Value::Int(2),
                Value::Int(5),
                Value::Int(6000),
                Value::Int(4),
                Value::Int(3),
            ]],
        )
        .unwrap();
        FeatureExtractor::new().append_to_table(&mut table).unwrap();
        assert_eq!(table.get(0, "age_squared"), Some(&Value::Float(900.0)));
    }

    #[test]
    fn test_missing_column_is_reported() {
        let mut table = Table::from_rows(["age"], vec![vec![Value::Int(30)]]).unwrap();
        let err = FeatureExtractor::new().append_to_table(&mut table).unwrap_err();
        assert_eq!(err, FeatureError::MissingColumn("annees_experience_totale"));
    }

    #[test]
    fn test_text_cell_is_reported() {
        let mut inputs = table_for(&[scenario()]);
        inputs
            .set_column("age", vec![Value::from("trente")])
            .unwrap();
        let err = FeatureExtractor::new().append_to_table(&mut inputs).unwrap_err();
        assert!(matches!(err, FeatureError::NonNumeric { column: "age", .. }));
    }

    proptest! {
        #[test]
        fn prop_ratios_follow_formulas(
            age in 0u32..100,
            total in 0u32..50,
            poste in 0u32..40,
            entreprise in 0u32..40,
            revenu in 0.0f64..50_000.0,
        ) {
            let inputs = FeatureInputs {
                age: age as f64,
                annees_experience_totale: total as f64,
                annees_dans_le_poste_actuel: poste as f64,
                annees_dans_l_entreprise: entreprise as f64,
                revenu_mensuel: revenu,
                satisfaction_employee_nature_travail: 2.0,
                satisfaction_employee_equilibre_pro_perso: 3.0,
            };
            let f = EngineeredFeatures::compute(&inputs);
            prop_assert!((f.experience_ratio - total as f64 / (age as f64 + 1.0)).abs() < 1e-12);
            prop_assert!((f.mobilite_ratio - poste as f64 / (entreprise as f64 + 1.0)).abs() < 1e-12);
            prop_assert!((f.revenu_par_experience - revenu / (total as f64 + 1.0)).abs() < 1e-9);
            prop_assert!(f.values().iter().all(|v| v.is_finite()));
        }

        #[test]
        fn prop_batch_equals_single(ages in proptest::collection::vec(18u32..70, 1..8)) {
            let inputs: Vec<FeatureInputs> = ages
                .iter()
                .map(|a| FeatureInputs { age: *a as f64, ..scenario() })
                .collect();
            let mut table = table_for(&inputs);
            FeatureExtractor::new().append_to_table(&mut table).unwrap();
            for (row, input) in inputs.iter().enumerate() {
                let single = EngineeredFeatures::compute(input);
                for (name, value) in single.named() {
                    prop_assert_eq!(table.get(row, name), Some(&Value::Float(value)));
                }
            }
        }
    }
}
