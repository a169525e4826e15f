use serde::{Deserialize, Serialize};

use super::AdvisoryError;
use crate::catalog::{DrugKey, MedicationProfile};
use crate::models::PatientProfile;

/// What the advisor is told.
#[derive(Debug, Clone, Serialize)]
pub struct AdvisoryRequest {
    pub patient: PatientProfile,
    pub drug_key: DrugKey,
    pub brand: &'static str,
    pub generic: &'static str,
    pub form: &'static str,
    pub frequency_label: &'static str,
    /// The advisor must not exceed this.
    pub max_dose_mg: u32,
}

impl AdvisoryRequest {
    pub fn new(patient: &PatientProfile, entry: &MedicationProfile, max_dose_mg: u32) -> Self {
        Self {
            patient: patient.clone(),
            drug_key: entry.key,
            brand: entry.brand(),
            generic: entry.generic,
            form: entry.form.as_str(),
            frequency_label: entry.frequency_label,
            max_dose_mg,
        }
    }
}

/// What the advisor proposed. `total_mg` is always finite and positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryProposal {
    pub drug_key: Option<String>,
    pub rationale: Option<String>,
    pub total_mg: f64,
}

/// A model endpoint that can second-guess the rule-based choice.
pub trait AdvisoryClient: Send + Sync {
    /// Ask for a proposal. Must return within the client's timeout.
    fn advise(&self, request: &AdvisoryRequest) -> Result<AdvisoryProposal, AdvisoryError>;

    /// Whether the backing model can be reached right now.
    fn is_available(&self) -> Result<bool, AdvisoryError>;

    /// Model identifier, for logs.
    fn model(&self) -> &str;
}
