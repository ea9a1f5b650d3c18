//! Column names and the fixed rename tables for historical schema drift

/// Join key shared by the three sources
pub const EMPLOYEE_ID: &str = "id_employee";
/// Evaluation key carrying the employee id as a digit run
pub const EVAL_NUMBER: &str = "eval_number";
/// Survey key carrying the employee id as a digit run
pub const SURVEY_CODE: &str = "code_sondage";
/// Ground-truth label, never sent to the classifier
pub const LABEL: &str = "a_quitte_l_entreprise";
/// Prior salary increase, fraction or percentage text
pub const SALARY_INCREASE: &str = "augmentation_salaire_precedente";
/// Oui/Non style flags
pub const FLAG_COLUMNS: [&str; 2] = ["heure_supplementaires", "ayant_enfants"];

pub const SIRH_RENAMES: [(&str, &str); 2] = [
    ("nombre_heures_travailless", "nombre_heures_travaillees"),
    ("annee_experience_totale", "annees_experience_totale"),
];

pub const EVALUATION_RENAMES: [(&str, &str); 1] = [(
    "augementation_salaire_precedente",
    "augmentation_salaire_precedente",
)];

pub const SURVEY_RENAMES: [(&str, &str); 1] = [(
    "annes_sous_reponsable_actuel",
    "annees_sous_reponsable_actuel",
)];

/// Columns removed before the matrix reaches the classifier
pub const DROPPED_COLUMNS: [&str; 3] = [EVAL_NUMBER, SURVEY_CODE, LABEL];
