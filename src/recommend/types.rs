use serde::Serialize;

use super::format::UnitDetails;
use super::safety::{Alternative, SafetyReport};
use super::triage::TriageAlert;
use crate::catalog::DrugKey;

pub const MEDICAL_DISCLAIMER: &str = "This is general information about over-the-counter \
medication, not medical advice. Read the product label and consult a pharmacist or doctor \
if symptoms persist, worsen, or you are unsure whether a medication is right for you.";

/// Label for how the dispensed amount was arrived at.
pub const DOSE_POLICY: &str = "bsa_conservative_with_safety_validation";

/// Outcome of one request. Serializes to either the alert body or the
/// full recommendation, with no wrapper.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Decision {
    Triage(TriageAlert),
    Recommendation(Box<Recommendation>),
}

impl Decision {
    pub fn is_triage(&self) -> bool {
        matches!(self, Self::Triage(_))
    }

    pub fn recommendation(&self) -> Option<&Recommendation> {
        match self {
            Self::Recommendation(r) => Some(r.as_ref()),
            Self::Triage(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub drug_key: DrugKey,
    pub drug_name: String,
    pub dosage: String,
    pub frequency: String,
    pub side_effects: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing_advice: Option<String>,
    pub safety_validation: SafetyValidation,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<Alternative>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<AdvisoryNote>,
    pub medical_disclaimer: &'static str,
    pub dose_basis: DoseBasis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SafetyValidation {
    pub is_safe: bool,
    pub warning: String,
    pub original_dose_mg: u32,
    pub validated_dose_mg: u32,
    pub dose_reduced: bool,
}

impl From<&SafetyReport> for SafetyValidation {
    fn from(report: &SafetyReport) -> Self {
        Self {
            is_safe: report.is_safe(),
            warning: report.warning_text(),
            original_dose_mg: report.entering_mg,
            validated_dose_mg: report.validated_mg,
            dose_reduced: report.was_reduced(),
        }
    }
}

/// Numbers behind the dispensed amount.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoseBasis {
    pub suggested_single_dose_mg: u32,
    pub validated_dose_mg: u32,
    pub single_dose_cap_mg: u32,
    pub max_daily_mg: Option<u32>,
    pub form: &'static str,
    #[serde(flatten)]
    pub units: UnitDetails,
    pub policy: &'static str,
    pub advisory_used: bool,
    pub safety_checks_passed: bool,
}

/// What the advisor contributed, when its answer was used.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvisoryNote {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    /// A different catalog drug the advisor would have picked. Reported only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_drug: Option<DrugKey>,
}
