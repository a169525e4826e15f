//! Independent second pass over the computed dose.
//!
//! Clamps only shrink the dose. The minimum-effective floor is applied
//! last and never lifts the result above the dose that entered; a
//! body-scaled analgesic left under the floor is flagged instead.

use serde::Serialize;

use crate::catalog::{Catalog, DrugKey};
use crate::models::PatientProfile;

use super::dose::body_scaled_baseline;

const PEDIATRIC_AGE: i32 = 12;
const ADOLESCENT_AGE: i32 = 18;
const PEDIATRIC_CAP_MG: u32 = 400;
const ADOLESCENT_CAP_MG: u32 = 600;
const LOW_WEIGHT_KG: f64 = 50.0;
const HIGH_WEIGHT_KG: f64 = 120.0;
const LOW_WEIGHT_CAP_MG: u32 = 400;
const ORGAN_CAP_MG: u32 = 400;
const GI_CAP_MG: u32 = 400;
const IBUPROFEN_MINOR_CAP_MG: u32 = 400;
const IBUPROFEN_ADULT_CAP_MG: u32 = 600;
const ACETAMINOPHEN_MINOR_CAP_MG: u32 = 500;
const ACETAMINOPHEN_ADULT_CAP_MG: u32 = 750;
const MIN_EFFECTIVE_MG: u32 = 200;

const ORGAN_TERMS: &[&str] = &["kidney", "renal", "liver", "hepatic"];
const GI_TERMS: &[&str] = &["ulcer", "gi bleed", "stomach"];
const LIVER_TERMS: &[&str] = &["liver", "hepatic"];
const ALT_GI_RENAL_TERMS: &[&str] = &["ulcer", "gi bleed", "kidney", "renal"];
const ALT_GI_TERMS: &[&str] = &["ulcer", "gi bleed"];

const COMBINATION_PAIN_LEVEL: i32 = 8;

pub const SAFE_MESSAGE: &str = "Dose validated and safe";

#[derive(Debug, Clone, PartialEq)]
pub struct SafetyReport {
    pub entering_mg: u32,
    pub validated_mg: u32,
    pub warnings: Vec<String>,
}

impl SafetyReport {
    pub fn is_safe(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn warning_text(&self) -> String {
        if self.warnings.is_empty() {
            SAFE_MESSAGE.to_string()
        } else {
            self.warnings.join("; ")
        }
    }

    pub fn was_reduced(&self) -> bool {
        self.validated_mg < self.entering_mg
    }
}

fn contains_any(text: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| text.contains(t))
}

/// Validate `entering_mg` for `key` against the patient's age, weight and
/// conditions. Rules needing a value the patient did not give are skipped.
pub fn validate_dose_safety(key: DrugKey, entering_mg: u32, patient: &PatientProfile) -> SafetyReport {
    let conditions = patient.condition_text();
    let mut warnings: Vec<String> = Vec::new();
    let mut mg = entering_mg;

    match patient.age {
        Some(age) if age < PEDIATRIC_AGE => {
            warnings.push("Pediatric dosing requires special consideration".into());
            mg = mg.min(PEDIATRIC_CAP_MG);
        }
        Some(age) if age < ADOLESCENT_AGE => {
            warnings.push("Adolescent dosing - using conservative approach".into());
            mg = mg.min(ADOLESCENT_CAP_MG);
        }
        _ => {}
    }

    match patient.weight_kg {
        Some(w) if w < LOW_WEIGHT_KG => {
            warnings.push("Low body weight - reducing dose for safety".into());
            mg = mg.min(LOW_WEIGHT_CAP_MG);
        }
        Some(w) if w > HIGH_WEIGHT_KG => {
            warnings.push("High body weight - dose may need adjustment".into());
        }
        _ => {}
    }

    if contains_any(&conditions, ORGAN_TERMS) {
        warnings.push("Kidney/liver conditions detected - using conservative dosing".into());
        mg = mg.min(ORGAN_CAP_MG);
    }
    if contains_any(&conditions, GI_TERMS) {
        warnings.push("GI conditions detected - ibuprofen may be contraindicated".into());
        mg = mg.min(GI_CAP_MG);
    }

    let minor = patient.is_minor();
    match key {
        DrugKey::Ibuprofen => {
            mg = mg.min(if minor { IBUPROFEN_MINOR_CAP_MG } else { IBUPROFEN_ADULT_CAP_MG });
            if entering_mg > IBUPROFEN_ADULT_CAP_MG {
                warnings.push("High ibuprofen dose - consider acetaminophen alternative".into());
            }
        }
        DrugKey::Acetaminophen => {
            mg = mg.min(if minor {
                ACETAMINOPHEN_MINOR_CAP_MG
            } else {
                ACETAMINOPHEN_ADULT_CAP_MG
            });
        }
        _ => {}
    }

    mg = mg.min(entering_mg).max(MIN_EFFECTIVE_MG.min(entering_mg));

    if mg < MIN_EFFECTIVE_MG && body_scaled_baseline(key).is_some() {
        warnings.push("Dose may be too low to be effective".into());
    }

    SafetyReport {
        entering_mg,
        validated_mg: mg,
        warnings,
    }
}

/// A different option surfaced when the validator flagged the dose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alternative {
    pub drug: String,
    pub brand: String,
    pub generic: String,
    pub reason: &'static str,
}

impl Alternative {
    fn from_catalog(catalog: &Catalog, key: DrugKey, reason: &'static str) -> Option<Self> {
        catalog.get(key).map(|entry| Self {
            drug: key.as_str().to_string(),
            brand: entry.brand().to_string(),
            generic: entry.generic.to_string(),
            reason,
        })
    }
}

/// Simple keyword rules for other options when the dose is flagged.
pub fn suggest_alternatives(catalog: &Catalog, patient: &PatientProfile) -> Vec<Alternative> {
    let conditions = patient.condition_text();
    let symptoms = patient.symptom_text();
    let mut alternatives = Vec::new();

    if contains_any(&conditions, ALT_GI_RENAL_TERMS)
        && (symptoms.contains("pain") || symptoms.contains("fever"))
    {
        alternatives.extend(Alternative::from_catalog(
            catalog,
            DrugKey::Acetaminophen,
            "Safer alternative for patients with GI/kidney conditions",
        ));
    }

    if contains_any(&conditions, LIVER_TERMS)
        && symptoms.contains("pain")
        && !contains_any(&conditions, ALT_GI_TERMS)
    {
        alternatives.extend(Alternative::from_catalog(
            catalog,
            DrugKey::Ibuprofen,
            "Alternative for patients with liver concerns",
        ));
    }

    if patient.pain_level.is_some_and(|p| p >= COMBINATION_PAIN_LEVEL) {
        alternatives.push(Alternative {
            drug: "combination".into(),
            brand: "Alternating".into(),
            generic: "Acetaminophen + Ibuprofen".into(),
            reason: "High pain level - consider alternating acetaminophen and ibuprofen",
        });
    }

    alternatives
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adult() -> PatientProfile {
        PatientProfile {
            age: Some(40),
            weight_kg: Some(70.0),
            symptoms: vec!["headache".into()],
            ..Default::default()
        }
    }

    #[test]
    fn healthy_adult_acetaminophen_capped_without_warning() {
        let report = validate_dose_safety(DrugKey::Acetaminophen, 1000, &adult());
        assert_eq!(report.validated_mg, 750);
        assert!(report.is_safe());
        assert!(report.was_reduced());
        assert_eq!(report.warning_text(), SAFE_MESSAGE);
    }

    #[test]
    fn child_is_clamped_to_pediatric_cap() {
        let child = PatientProfile {
            age: Some(10),
            weight_kg: Some(30.0),
            ..adult()
        };
        let report = validate_dose_safety(DrugKey::Ibuprofen, 800, &child);
        assert_eq!(report.validated_mg, 400);
        assert!(!report.is_safe());
        assert!(report.warning_text().contains("Pediatric dosing"));
        assert!(report.warning_text().contains("Low body weight"));
    }

    #[test]
    fn low_analgesic_dose_is_flagged_not_lifted() {
        let child = PatientProfile {
            age: Some(10),
            weight_kg: Some(30.0),
            ..adult()
        };
        let report = validate_dose_safety(DrugKey::Acetaminophen, 150, &child);
        assert_eq!(report.validated_mg, 150);
        assert!(report.warning_text().contains("too low to be effective"));

        let report = validate_dose_safety(DrugKey::Acetaminophen, 350, &child);
        assert_eq!(report.validated_mg, 350);
        assert!(!report.warning_text().contains("too low"));
    }

    #[test]
    fn infant_ibuprofen_gets_low_dose_warning() {
        let infant = PatientProfile {
            age: Some(1),
            height_cm: Some(60.0),
            weight_kg: Some(6.0),
            symptoms: vec!["fever".into()],
            ..Default::default()
        };
        let entry = Catalog::standard().get(DrugKey::Ibuprofen).unwrap();
        let suggested = crate::recommend::dose::suggested_single_dose(entry, &infant);
        assert_eq!(suggested, 150);

        let report = validate_dose_safety(DrugKey::Ibuprofen, suggested, &infant);
        assert_eq!(report.validated_mg, 150);
        assert!(report.warning_text().contains("Pediatric dosing"));
        assert!(report.warning_text().contains("Dose may be too low to be effective"));
    }

    #[test]
    fn floor_never_exceeds_entering_dose() {
        let report = validate_dose_safety(DrugKey::Cetirizine, 10, &adult());
        assert_eq!(report.validated_mg, 10);
        // fixed label doses are not compared against the analgesic floor
        assert!(report.is_safe());
    }

    #[test]
    fn adolescent_ibuprofen() {
        let teen = PatientProfile {
            age: Some(15),
            ..adult()
        };
        let report = validate_dose_safety(DrugKey::Ibuprofen, 700, &teen);
        assert_eq!(report.validated_mg, 400);
        assert!(report.warning_text().contains("Adolescent"));
        assert!(report.warning_text().contains("High ibuprofen dose"));
    }

    #[test]
    fn heavy_patient_only_warns() {
        let heavy = PatientProfile {
            weight_kg: Some(150.0),
            ..adult()
        };
        let report = validate_dose_safety(DrugKey::Guaifenesin, 600, &heavy);
        assert_eq!(report.validated_mg, 600);
        assert_eq!(report.warning_text(), "High body weight - dose may need adjustment");
    }

    #[test]
    fn organ_and_gi_conditions_use_substring_match() {
        let p = PatientProfile {
            conditions: vec!["Chronic Kidney Disease".into(), "stomach ulcer".into()],
            ..adult()
        };
        let report = validate_dose_safety(DrugKey::Acetaminophen, 1000, &p);
        assert_eq!(report.validated_mg, 400);
        assert_eq!(report.warnings.len(), 2);
        assert!(report.warning_text().contains("; "));
    }

    #[test]
    fn missing_age_and_weight_skip_rules() {
        let p = PatientProfile {
            symptoms: vec!["pain".into()],
            ..Default::default()
        };
        let report = validate_dose_safety(DrugKey::Ibuprofen, 600, &p);
        assert_eq!(report.validated_mg, 600);
        assert!(report.is_safe());
    }

    #[test]
    fn validated_never_exceeds_entering() {
        for entering in [50, 100, 199, 200, 250, 400, 600, 800, 1000] {
            for age in [Some(5), Some(15), Some(40), None] {
                let p = PatientProfile { age, ..adult() };
                for key in [DrugKey::Acetaminophen, DrugKey::Ibuprofen, DrugKey::Famotidine] {
                    let report = validate_dose_safety(key, entering, &p);
                    assert!(report.validated_mg <= entering);
                }
            }
        }
    }

    #[test]
    fn alternatives_for_kidney_pain() {
        let p = PatientProfile {
            symptoms: vec!["back pain".into()],
            conditions: vec!["renal failure".into()],
            ..adult()
        };
        let alts = suggest_alternatives(Catalog::standard(), &p);
        assert_eq!(alts.len(), 1);
        assert_eq!(alts[0].drug, "acetaminophen");
        assert_eq!(alts[0].brand, "Tylenol");
    }

    #[test]
    fn alternatives_for_liver_without_gi() {
        let p = PatientProfile {
            symptoms: vec!["joint pain".into()],
            conditions: vec!["hepatic impairment".into()],
            ..adult()
        };
        let alts = suggest_alternatives(Catalog::standard(), &p);
        assert_eq!(alts.len(), 1);
        assert_eq!(alts[0].drug, "ibuprofen");

        let p = PatientProfile {
            conditions: vec!["liver disease".into(), "ulcer".into()],
            ..p
        };
        let alts = suggest_alternatives(Catalog::standard(), &p);
        assert!(alts.iter().all(|a| a.drug != "ibuprofen"));
    }

    #[test]
    fn combination_for_high_pain() {
        let p = PatientProfile {
            pain_level: Some(8),
            ..adult()
        };
        let alts = suggest_alternatives(Catalog::standard(), &p);
        assert_eq!(alts.len(), 1);
        assert_eq!(alts[0].drug, "combination");
    }
}
