//! Reconciliation Pipeline

use crate::join::inner_join;
use crate::keys::{key_column, strict_key_column};
use crate::normalizer::{normalize_flag, normalize_percentage};
use crate::schema::{
    DROPPED_COLUMNS, EMPLOYEE_ID, EVALUATION_RENAMES, EVAL_NUMBER, FLAG_COLUMNS, SALARY_INCREASE,
    SIRH_RENAMES, SURVEY_CODE, SURVEY_RENAMES,
};
use crate::{EmptyReason, ReconcileError, SourceKind};
use feature_engine::FeatureExtractor;
use record_table::{Table, TableError, Value};
use tracing::{debug, info};

/// Reconciled, feature-engineered table ready for the classifier.
///
/// `employee_ids` is row-aligned with the table.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    table: Table,
    employee_ids: Vec<i64>,
}

impl FeatureMatrix {
    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn employee_ids(&self) -> &[i64] {
        &self.employee_ids
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Outcome of a reconciliation that did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciliation {
    Ready(FeatureMatrix),
    Empty(EmptyReason),
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        matches!(self, Reconciliation::Empty(_))
    }
}

/// Stateless reconciler; safe to share across requests
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    extractor: FeatureExtractor,
}

impl Reconciler {
    pub fn new() -> Self {
        Self {
            extractor: FeatureExtractor::new(),
        }
    }

    /// Run the full pipeline. Inputs are only read; new tables are built.
    pub fn reconcile(
        &self,
        sirh: &Table,
        evaluation: &Table,
        survey: &Table,
    ) -> Result<Reconciliation, ReconcileError> {
        for (kind, table) in [
            (SourceKind::Sirh, sirh),
            (SourceKind::Evaluation, evaluation),
            (SourceKind::Survey, survey),
        ] {
            if table.is_empty() {
                info!("Reconciliation skipped: {} table is empty", kind);
                return Ok(Reconciliation::Empty(EmptyReason::EmptySource(kind)));
            }
        }

        // Step 1: canonical column names
        let mut sirh = sirh.clone();
        let mut evaluation = evaluation.clone();
        let mut survey = survey.clone();
        sirh.rename(&SIRH_RENAMES)?;
        evaluation.rename(&EVALUATION_RENAMES)?;
        survey.rename(&SURVEY_RENAMES)?;

        // Step 2: join keys
        let sirh_keys = strict_key_column(&sirh, SourceKind::Sirh, EMPLOYEE_ID)?;
        let eval_keys = key_column(&evaluation, SourceKind::Evaluation, EVAL_NUMBER)?;
        let survey_keys = key_column(&survey, SourceKind::Survey, SURVEY_CODE)?;
        evaluation.set_column(EMPLOYEE_ID, to_values(&eval_keys))?;
        survey.set_column(EMPLOYEE_ID, to_values(&survey_keys))?;

        // Step 3: SIRH ⋈ evaluation ⋈ survey
        let (merged, merged_keys) =
            inner_join(&sirh, &sirh_keys, &evaluation, &eval_keys, EMPLOYEE_ID)?;
        let (mut full, keys) = inner_join(&merged, &merged_keys, &survey, &survey_keys, EMPLOYEE_ID)?;
        if full.is_empty() {
            info!("Reconciliation produced no rows: join is empty");
            return Ok(Reconciliation::Empty(EmptyReason::EmptyJoin));
        }
        full.set_column(EMPLOYEE_ID, to_values(&keys))?;
        debug!(
            "Joined {} SIRH, {} evaluation, {} survey rows into {}",
            sirh.len(),
            evaluation.len(),
            survey.len(),
            full.len()
        );

        // Step 4: salary increase as a fraction
        full.try_map_column(SALARY_INCREASE, normalize_percentage)?;

        // Step 5: Oui/Non flags
        for column in FLAG_COLUMNS {
            full.try_map_column(column, |_, v| Ok::<_, TableError>(normalize_flag(v)))?;
        }

        // Step 6: engineered features
        self.extractor.append_to_table(&mut full)?;

        // Step 7: identifiers and label never reach the model
        full.drop_columns(&DROPPED_COLUMNS);

        info!(
            "Reconciled feature matrix: {} rows x {} columns",
            full.len(),
            full.width()
        );
        Ok(Reconciliation::Ready(FeatureMatrix {
            table: full,
            employee_ids: keys,
        }))
    }
}

/// Reconcile the three extracts with a default [`Reconciler`]
pub fn preprocess_input(
    evaluation: &Table,
    sirh: &Table,
    survey: &Table,
) -> Result<Reconciliation, ReconcileError> {
    Reconciler::new().reconcile(sirh, evaluation, survey)
}

fn to_values(keys: &[i64]) -> Vec<Value> {
    keys.iter().map(|k| Value::Int(*k)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_engine::FEATURE_NAMES;
    use proptest::prelude::*;

    fn sirh(ids: &[i64]) -> Table {
        let rows = ids
            .iter()
            .map(|id| {
                vec![
                    Value::Int(*id),
                    Value::Int(30 + *id),
                    Value::Int(80),
                    Value::Int(5 + *id),
                    Value::Int(3),
                    Value::Int(2),
                    Value::Float(5000.0 + *id as f64),
                    Value::from(if id % 2 == 0 { "Oui" } else { "Non" }),
                    Value::from("Y"),
                    Value::from("Sales"),
                    Value::from(if id % 3 == 0 { "Oui" } else { "Non" }),
                ]
            })
            .collect();
        Table::from_rows(
            [
                "id_employee",
                "age",
                "nombre_heures_travailless",
                "annee_experience_totale",
                "annees_dans_l_entreprise",
                "annees_dans_le_poste_actuel",
                "revenu_mensuel",
                "heure_supplementaires",
                "ayant_enfants",
                "departement",
                "a_quitte_l_entreprise",
            ],
            rows,
        )
        .unwrap()
    }

    fn evaluation(ids: &[i64]) -> Table {
        let rows = ids
            .iter()
            .map(|id| {
                vec![
                    Value::from(format!("E_{}", id)),
                    Value::from(format!("{} %", 10 + id)),
                    Value::Int(3),
                ]
            })
            .collect();
        Table::from_rows(
            [
                "eval_number",
                "augementation_salaire_precedente",
                "note_evaluation_actuelle",
            ],
            rows,
        )
        .unwrap()
    }

    fn survey(ids: &[i64]) -> Table {
        let rows = ids
            .iter()
            .map(|id| {
                vec![
                    Value::from(format!("{:07}", id)),
                    Value::Int(4),
                    Value::Int(3),
                    Value::Int(1),
                ]
            })
            .collect();
        Table::from_rows(
            [
                "code_sondage",
                "satisfaction_employee_nature_travail",
                "satisfaction_employee_equilibre_pro_perso",
                "annes_sous_reponsable_actuel",
            ],
            rows,
        )
        .unwrap()
    }

    fn ready(result: Reconciliation) -> FeatureMatrix {
        match result {
            Reconciliation::Ready(matrix) => matrix,
            Reconciliation::Empty(reason) => panic!("unexpected empty result: {}", reason),
        }
    }

    #[test]
    fn test_full_pipeline() {
        let matrix = ready(
            Reconciler::new()
                .reconcile(&sirh(&[1, 2]), &evaluation(&[1, 2]), &survey(&[1, 2]))
                .unwrap(),
        );
        let table = matrix.table();

        assert_eq!(matrix.employee_ids(), &[1, 2]);
        assert_eq!(table.len(), 2);
        for dropped in DROPPED_COLUMNS {
            assert!(!table.has_column(dropped), "{} should be dropped", dropped);
        }
        for renamed in [
            "nombre_heures_travaillees",
            "annees_experience_totale",
            "augmentation_salaire_precedente",
            "annees_sous_reponsable_actuel",
        ] {
            assert!(table.has_column(renamed), "{} missing", renamed);
        }
        for feature in FEATURE_NAMES {
            assert!(table.has_column(feature));
        }

        assert_eq!(
            table.get(0, "augmentation_salaire_precedente"),
            Some(&Value::Float(0.11))
        );
        assert_eq!(table.get(0, "heure_supplementaires"), Some(&Value::Int(0)));
        assert_eq!(table.get(1, "heure_supplementaires"), Some(&Value::Int(1)));
        assert_eq!(table.get(0, "ayant_enfants"), Some(&Value::Int(1)));
        assert_eq!(table.get(1, "id_employee"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_row_order_follows_sirh() {
        let matrix = ready(
            Reconciler::new()
                .reconcile(&sirh(&[5, 3, 9]), &evaluation(&[9, 3, 5]), &survey(&[3, 9, 5]))
                .unwrap(),
        );
        assert_eq!(matrix.employee_ids(), &[5, 3, 9]);
        assert_eq!(matrix.table().get(2, "age"), Some(&Value::Int(39)));
    }

    #[test]
    fn test_empty_inputs() {
        let empty_eval = Table::new(["eval_number"]).unwrap();
        let result = Reconciler::new()
            .reconcile(&sirh(&[1]), &empty_eval, &survey(&[1]))
            .unwrap();
        assert_eq!(
            result,
            Reconciliation::Empty(EmptyReason::EmptySource(SourceKind::Evaluation))
        );

        let no_columns = Table::default();
        let result = preprocess_input(&no_columns, &no_columns, &no_columns).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_disjoint_ids_yield_empty_join() {
        let result = Reconciler::new()
            .reconcile(&sirh(&[1, 2]), &evaluation(&[3]), &survey(&[1, 2]))
            .unwrap();
        assert_eq!(result, Reconciliation::Empty(EmptyReason::EmptyJoin));
    }

    #[test]
    fn test_malformed_eval_number_fails() {
        let mut eval = evaluation(&[1]);
        eval.set_column("eval_number", vec![Value::from("EVAL")]).unwrap();
        let err = Reconciler::new()
            .reconcile(&sirh(&[1]), &eval, &survey(&[1]))
            .unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::MalformedIdentifier {
                table: SourceKind::Evaluation,
                ..
            }
        ));
    }

    #[test]
    fn test_non_integer_sirh_id_fails() {
        for bad in [Value::Float(3.7), Value::from("abc3xyz")] {
            let mut s = sirh(&[3]);
            s.set_column("id_employee", vec![bad.clone()]).unwrap();
            let err = Reconciler::new()
                .reconcile(&s, &evaluation(&[3]), &survey(&[3]))
                .unwrap_err();
            assert_eq!(
                err,
                ReconcileError::MalformedIdentifier {
                    table: SourceKind::Sirh,
                    column: "id_employee",
                    row: 0,
                    value: bad.to_string(),
                }
            );
        }
    }

    #[test]
    fn test_malformed_percentage_fails() {
        let mut eval = evaluation(&[1]);
        eval.set_column("augementation_salaire_precedente", vec![Value::from("n/a")])
            .unwrap();
        let err = Reconciler::new()
            .reconcile(&sirh(&[1]), &eval, &survey(&[1]))
            .unwrap_err();
        assert!(matches!(err, ReconcileError::MalformedPercentage { row: 0, .. }));
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let s = sirh(&[1]);
        let e = evaluation(&[1]);
        let v = survey(&[1]);
        let before = (s.clone(), e.clone(), v.clone());
        Reconciler::new().reconcile(&s, &e, &v).unwrap();
        assert_eq!((s, e, v), before);
    }

    proptest! {
        #[test]
        fn prop_row_count_is_join_cardinality(
            sirh_ids in proptest::collection::btree_set(1i64..40, 1..15),
            eval_ids in proptest::collection::btree_set(1i64..40, 1..15),
            survey_ids in proptest::collection::btree_set(1i64..40, 1..15),
        ) {
            let s: Vec<i64> = sirh_ids.iter().copied().collect();
            let e: Vec<i64> = eval_ids.iter().copied().collect();
            let v: Vec<i64> = survey_ids.iter().copied().collect();
            let expected: Vec<i64> = s
                .iter()
                .copied()
                .filter(|id| eval_ids.contains(id) && survey_ids.contains(id))
                .collect();

            let result = Reconciler::new().reconcile(&sirh(&s), &evaluation(&e), &survey(&v)).unwrap();
            match result {
                Reconciliation::Ready(matrix) => {
                    prop_assert_eq!(matrix.employee_ids(), expected.as_slice());
                    prop_assert!(matrix.len() <= s.len().min(e.len()).min(v.len()));
                    for dropped in DROPPED_COLUMNS {
                        prop_assert!(!matrix.table().has_column(dropped));
                    }
                }
                Reconciliation::Empty(reason) => {
                    prop_assert!(expected.is_empty());
                    prop_assert_eq!(reason, EmptyReason::EmptyJoin);
                }
            }
        }

        #[test]
        fn prop_reconciliation_is_idempotent(ids in proptest::collection::btree_set(1i64..60, 1..12)) {
            let ids: Vec<i64> = ids.into_iter().collect();
            let (s, e, v) = (sirh(&ids), evaluation(&ids), survey(&ids));
            let reconciler = Reconciler::new();
            let first = ready(reconciler.reconcile(&s, &e, &v).unwrap());
            let second = ready(reconciler.reconcile(&s, &e, &v).unwrap());

            prop_assert_eq!(first.table().columns(), second.table().columns());
            for (a, b) in first.table().rows().iter().zip(second.table().rows()) {
                for (x, y) in a.iter().zip(b) {
                    match (x, y) {
                        (Value::Float(x), Value::Float(y)) => prop_assert_eq!(x.to_bits(), y.to_bits()),
                        _ => prop_assert_eq!(x, y),
                    }
                }
            }
        }
    }
}
