use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Population defaults used only for dose arithmetic.
pub const DEFAULT_HEIGHT_CM: f64 = 170.0;
pub const DEFAULT_WEIGHT_KG: f64 = 70.0;

const MAX_AGE: i32 = 120;
const MIN_WEIGHT_KG: f64 = 1.0;
const MAX_WEIGHT_KG: f64 = 400.0;
const MIN_HEIGHT_CM: f64 = 30.0;
const MAX_HEIGHT_CM: f64 = 250.0;
const MAX_PAIN_LEVEL: i32 = 10;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("{0} must be a finite number")]
    NotFinite(&'static str),

    #[error("At least one symptom is required")]
    NoSymptoms,
}

/// One symptom report, as received from the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub pain_level: Option<i32>,
    #[serde(default)]
    pub notes: Option<String>,
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub conditions: Vec<String>,
}

impl PatientProfile {
    /// Boundary checks. Nothing downstream runs on a profile that fails here.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(age) = self.age {
            check_range("age", f64::from(age), 0.0, f64::from(MAX_AGE))?;
        }
        if let Some(weight) = self.weight_kg {
            check_finite_range("weight_kg", weight, MIN_WEIGHT_KG, MAX_WEIGHT_KG)?;
        }
        if let Some(height) = self.height_cm {
            check_finite_range("height_cm", height, MIN_HEIGHT_CM, MAX_HEIGHT_CM)?;
        }
        if let Some(pain) = self.pain_level {
            check_range("pain_level", f64::from(pain), 0.0, f64::from(MAX_PAIN_LEVEL))?;
        }
        if self.symptoms.iter().all(|s| s.trim().is_empty()) {
            return Err(ValidationError::NoSymptoms);
        }
        Ok(())
    }

    pub fn symptom_text(&self) -> String {
        fold_join(&self.symptoms)
    }

    pub fn allergy_text(&self) -> String {
        fold_join(&self.allergies)
    }

    pub fn condition_text(&self) -> String {
        fold_join(&self.conditions)
    }

    /// Red-flag scanning covers symptoms and conditions together.
    pub fn triage_text(&self) -> String {
        let mut text = self.symptom_text();
        if !self.conditions.is_empty() {
            text.push(' ');
            text.push_str(&self.condition_text());
        }
        text
    }

    pub fn notes_text(&self) -> &str {
        self.notes.as_deref().unwrap_or("")
    }

    pub fn dose_height_cm(&self) -> f64 {
        self.height_cm.unwrap_or(DEFAULT_HEIGHT_CM)
    }

    pub fn dose_weight_kg(&self) -> f64 {
        self.weight_kg.unwrap_or(DEFAULT_WEIGHT_KG)
    }

    /// Known to be under 18. Unknown age is not treated as a minor.
    pub fn is_minor(&self) -> bool {
        self.age.is_some_and(|a| a < 18)
    }
}

fn fold_join(items: &[String]) -> String {
    items
        .iter()
        .map(|s| s.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            min,
            max,
            value,
        });
    }
    Ok(())
}

fn check_finite_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite(field));
    }
    check_range(field, value, min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> PatientProfile {
        PatientProfile {
            age: Some(30),
            weight_kg: Some(65.0),
            height_cm: Some(170.0),
            symptoms: vec!["Headache".into()],
            ..Default::default()
        }
    }

    #[test]
    fn valid_profile_passes() {
        assert_eq!(profile().validate(), Ok(()));
    }

    #[test]
    fn age_out_of_range() {
        let mut p = profile();
        p.age = Some(121);
        assert!(matches!(
            p.validate(),
            Err(ValidationError::OutOfRange { field: "age", .. })
        ));
        p.age = Some(-1);
        assert!(p.validate().is_err());
    }

    #[test]
    fn weight_and_height_bounds() {
        let mut p = profile();
        p.weight_kg = Some(0.5);
        assert!(matches!(
            p.validate(),
            Err(ValidationError::OutOfRange { field: "weight_kg", .. })
        ));

        let mut p = profile();
        p.height_cm = Some(251.0);
        assert!(matches!(
            p.validate(),
            Err(ValidationError::OutOfRange { field: "height_cm", .. })
        ));

        let mut p = profile();
        p.weight_kg = Some(f64::NAN);
        assert_eq!(p.validate(), Err(ValidationError::NotFinite("weight_kg")));
    }

    #[test]
    fn pain_level_bounds() {
        let mut p = profile();
        p.pain_level = Some(11);
        assert!(p.validate().is_err());
        p.pain_level = Some(10);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn empty_symptoms_rejected() {
        let mut p = profile();
        p.symptoms.clear();
        assert_eq!(p.validate(), Err(ValidationError::NoSymptoms));
        p.symptoms = vec!["  ".into()];
        assert_eq!(p.validate(), Err(ValidationError::NoSymptoms));
    }

    #[test]
    fn long_notes_are_accepted() {
        let mut p = profile();
        p.notes = Some("a".repeat(5000));
        assert_eq!(p.validate(), Ok(()));
    }

    #[test]
    fn missing_numeric_fields_are_valid() {
        let p = PatientProfile {
            symptoms: vec!["cough".into()],
            ..Default::default()
        };
        assert!(p.validate().is_ok());
        assert_eq!(p.dose_height_cm(), DEFAULT_HEIGHT_CM);
        assert_eq!(p.dose_weight_kg(), DEFAULT_WEIGHT_KG);
        assert!(!p.is_minor());
    }

    #[test]
    fn text_helpers_case_fold() {
        let mut p = profile();
        p.symptoms = vec!["Sore Throat".into(), "FEVER".into()];
        p.conditions = vec!["Kidney Disease".into()];
        assert_eq!(p.symptom_text(), "sore throat fever");
        assert_eq!(p.triage_text(), "sore throat fever kidney disease");
    }

    #[test]
    fn deserializes_with_defaults() {
        let p: PatientProfile = serde_json::from_str(r#"{"symptoms":["cough"]}"#).unwrap();
        assert!(p.allergies.is_empty());
        assert!(p.conditions.is_empty());
        assert_eq!(p.age, None);
    }
}
