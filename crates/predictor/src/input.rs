//! Single-employee input record

use feature_engine::{FeatureError, FeatureExtractor};
use record_table::{Table, Value};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Attributes of one employee, as posted to the single prediction endpoint.
/// Every field is optional on the wire and falls back to a typical profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct EmployeeInput {
    pub employee_id: Option<i64>,
    #[validate(range(min = 0, max = 120))]
    pub age: i64,
    #[validate(range(min = 0))]
    pub nombre_heures_travaillees: i64,
    #[validate(range(min = 0))]
    pub annees_experience_totale: i64,
    #[validate(range(min = 0))]
    pub annees_dans_l_entreprise: i64,
    #[validate(range(min = 0))]
    pub annees_dans_le_poste_actuel: i64,
    #[validate(range(min = 0))]
    pub annees_depuis_la_derniere_promotion: i64,
    #[validate(range(min = 0.0))]
    pub revenu_mensuel: f64,
    #[validate(range(min = 0, max = 1))]
    pub heure_supplementaires: i64,
    #[validate(range(min = 0, max = 1))]
    pub ayant_enfants: i64,
    #[validate(range(min = 0.0))]
    pub distance_domicile_travail: f64,
    pub departement: String,
    #[validate(range(min = 1, max = 5))]
    pub niveau_education: i64,
    pub domaine_etude: String,
    pub genre: String,
    pub poste: String,
    pub statut_marital: String,
    #[validate(range(min = 0))]
    pub nombre_experiences_precedentes: i64,
    #[validate(range(min = 1, max = 4))]
    pub note_evaluation_precedente: i64,
    #[validate(range(min = 1, max = 4))]
    pub note_evaluation_actuelle: i64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub augmentation_salaire_precedente: f64,
    #[validate(range(min = 1, max = 4))]
    pub satisfaction_employee_nature_travail: i64,
    #[validate(range(min = 1, max = 4))]
    pub satisfaction_employee_equilibre_pro_perso: i64,
    #[validate(range(min = 1, max = 4))]
    pub satisfaction_employee_environnement: i64,
    #[validate(range(min = 1, max = 4))]
    pub satisfaction_employee_equipe: i64,
    #[validate(range(min = 1, max = 4))]
    pub implication_employee: i64,
    #[serde(
        alias = "annes_sous_responsable_actuel",
        alias = "annes_sous_reponsable_actuel"
    )]
    #[validate(range(min = 0))]
    pub annees_sous_reponsable_actuel: i64,
    #[validate(range(min = 0))]
    pub nombre_employee_sous_responsabilite: i64,
    #[validate(range(min = 1, max = 5))]
    pub niveau_hierarchique_poste: i64,
    #[validate(range(min = 0))]
    pub nb_formations_suivies: i64,
    pub frequence_deplacement: String,
    #[validate(range(min = 0))]
    pub nombre_participation_pee: i64,
}

impl Default for EmployeeInput {
    fn default() -> Self {
        Self {
            employee_id: None,
            age: 35,
            nombre_heures_travaillees: 80,
            annees_experience_totale: 10,
            annees_dans_l_entreprise: 5,
            annees_dans_le_poste_actuel: 2,
            annees_depuis_la_derniere_promotion: 1,
            revenu_mensuel: 5000.0,
            heure_supplementaires: 0,
            ayant_enfants: 1,
            distance_domicile_travail: 10.0,
            departement: "Sales".to_string(),
            niveau_education: 3,
            domaine_etude: "Life Sciences".to_string(),
            genre: "Male".to_string(),
            poste: "Sales Executive".to_string(),
            statut_marital: "Married".to_string(),
            nombre_experiences_precedentes: 2,
            note_evaluation_precedente: 3,
            note_evaluation_actuelle: 3,
            augmentation_salaire_precedente: 0.15,
            satisfaction_employee_nature_travail: 3,
            satisfaction_employee_equilibre_pro_perso: 3,
            satisfaction_employee_environnement: 3,
            satisfaction_employee_equipe: 3,
            implication_employee: 3,
            annees_sous_reponsable_actuel: 2,
            nombre_employee_sous_responsabilite: 0,
            niveau_hierarchique_poste: 2,
            nb_formations_suivies: 3,
            frequence_deplacement: "Travel_Rarely".to_string(),
            nombre_participation_pee: 1,
        }
    }
}

impl EmployeeInput {
    /// Named cells in the column layout of the reconciled matrix
    fn cells(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id_employee", Value::from(self.employee_id)),
            ("age", Value::Int(self.age)),
            ("nombre_heures_travaillees", Value::Int(self.nombre_heures_travaillees)),
            ("annees_experience_totale", Value::Int(self.annees_experience_totale)),
            ("annees_dans_l_entreprise", Value::Int(self.annees_dans_l_entreprise)),
            ("annees_dans_le_poste_actuel", Value::Int(self.annees_dans_le_poste_actuel)),
            (
                "annees_depuis_la_derniere_promotion",
                Value::Int(self.annees_depuis_la_derniere_promotion),
            ),
            ("revenu_mensuel", Value::Float(self.revenu_mensuel)),
            ("heure_supplementaires", Value::Int(self.heure_supplementaires)),
            ("ayant_enfants", Value::Int(self.ayant_enfants)),
            ("distance_domicile_travail", Value::Float(self.distance_domicile_travail)),
            ("departement", Value::from(self.departement.as_str())),
            ("niveau_education", Value::Int(self.niveau_education)),
            ("domaine_etude", Value::from(self.domaine_etude.as_str())),
            ("genre", Value::from(self.genre.as_str())),
            ("poste", Value::from(self.poste.as_str())),
            ("statut_marital", Value::from(self.statut_marital.as_str())),
            (
                "nombre_experiences_precedentes",
                Value::Int(self.nombre_experiences_precedentes),
            ),
            ("note_evaluation_precedente", Value::Int(self.note_evaluation_precedente)),
            ("note_evaluation_actuelle", Value::Int(self.note_evaluation_actuelle)),
            (
                "augmentation_salaire_precedente",
                Value::Float(self.augmentation_salaire_precedente),
            ),
            (
                "satisfaction_employee_nature_travail",
                Value::Int(self.satisfaction_employee_nature_travail),
            ),
            (
                "satisfaction_employee_equilibre_pro_perso",
                Value::Int(self.satisfaction_employee_equilibre_pro_perso),
            ),
            (
                "satisfaction_employee_environnement",
                Value::Int(self.satisfaction_employee_environnement),
            ),
            ("satisfaction_employee_equipe", Value::Int(self.satisfaction_employee_equipe)),
            ("implication_employee", Value::Int(self.implication_employee)),
            (
                "annees_sous_reponsable_actuel",
                Value::Int(self.annees_sous_reponsable_actuel),
            ),
            (
                "nombre_employee_sous_responsabilite",
                Value::Int(self.nombre_employee_sous_responsabilite),
            ),
            ("niveau_hierarchique_poste", Value::Int(self.niveau_hierarchique_poste)),
            ("nb_formations_suivies", Value::Int(self.nb_formations_suivies)),
            ("frequence_deplacement", Value::from(self.frequence_deplacement.as_str())),
            ("nombre_participation_pee", Value::Int(self.nombre_participation_pee)),
        ]
    }

    /// One-row feature table: the input fields plus the engineered features.
    /// No renaming, joining or flag/percentage normalization is applied.
    pub fn to_table(&self) -> Result<Table, FeatureError> {
        let (columns, row): (Vec<&str>, Vec<Value>) = self.cells().into_iter().unzip();
        let mut table = Table::from_rows(columns, vec![row])?;
        FeatureExtractor::new().append_to_table(&mut table)?;
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_engine::{EngineeredFeatures, FeatureInputs, FEATURE_NAMES};

    #[test]
    fn test_empty_body_uses_defaults() {
        let input: EmployeeInput = serde_json::from_str("{}").unwrap();
        assert_eq!(input, EmployeeInput::default());
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_manager_tenure_aliases() {
        for key in [
            "annees_sous_reponsable_actuel",
            "annes_sous_responsable_actuel",
            "annes_sous_reponsable_actuel",
        ] {
            let input: EmployeeInput =
                serde_json::from_str(&format!(r#"{{"{}": 7}}"#, key)).unwrap();
            assert_eq!(input.annees_sous_reponsable_actuel, 7);
        }
    }

    #[test]
    fn test_out_of_range_rating_is_rejected() {
        let input = EmployeeInput {
            satisfaction_employee_equipe: 9,
            ..Default::default()
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("satisfaction_employee_equipe"));
    }

    #[test]
    fn test_negative_values_are_rejected() {
        let input = EmployeeInput {
            age: -1,
            revenu_mensuel: -10.0,
            ..Default::default()
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("age"));
        assert!(errors.field_errors().contains_key("revenu_mensuel"));
    }

    #[test]
    fn test_table_carries_engineered_features() {
        let input = EmployeeInput {
            employee_id: Some(42),
            age: 30,
            revenu_mensuel: 6000.0,
            satisfaction_employee_nature_travail: 4,
            ..Default::default()
        };
        let table = input.to_table().unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0, "id_employee"), Some(&Value::Int(42)));

        let expected = EngineeredFeatures::compute(&FeatureInputs {
            age: 30.0,
            annees_experience_totale: 10.0,
            annees_dans_le_poste_actuel: 2.0,
            annees_dans_l_entreprise: 5.0,
            revenu_mensuel: 6000.0,
            satisfaction_employee_nature_travail: 4.0,
            satisfaction_employee_equilibre_pro_perso: 3.0,
        });
        for (name, value) in expected.named() {
            assert_eq!(table.get(0, name), Some(&Value::Float(value)));
        }
        assert_eq!(table.get(0, FEATURE_NAMES[1]), Some(&Value::Float(900.0)));
    }
}
