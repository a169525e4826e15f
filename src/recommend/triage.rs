//! Red-flag gate. Runs before anything else; an alert is terminal.

use serde::Serialize;

use crate::models::PatientProfile;

/// Phrases that send the user to a clinician instead of the shelf.
/// Plain substring match over case-folded symptom + condition text;
/// no negation handling.
pub const RED_FLAGS: &[&str] = &[
    "chest pain",
    "shortness of breath",
    "difficulty breathing",
    "severe pain",
    "numbness",
    "weakness on one side",
    "confusion",
    "fainting",
    "blood in vomit",
    "black stools",
    "suicidal thoughts",
    "stroke",
    "heart attack",
    "cancer",
];

pub const TRIAGE_LABEL: &str = "See a doctor";
pub const TRIAGE_MESSAGE: &str = "One or more symptoms suggest a potentially serious condition. \
     Please seek medical care immediately.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriageResult {
    Clear,
    Alert { matched: Vec<&'static str> },
}

/// Fixed advisory returned on the alert path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriageAlert {
    pub triage_alert: &'static str,
    pub message: &'static str,
}

impl Default for TriageAlert {
    fn default() -> Self {
        Self {
            triage_alert: TRIAGE_LABEL,
            message: TRIAGE_MESSAGE,
        }
    }
}

/// Scan already case-folded text for red-flag phrases.
pub fn scan_red_flags(text: &str) -> TriageResult {
    let matched: Vec<&'static str> = RED_FLAGS
        .iter()
        .copied()
        .filter(|flag| text.contains(flag))
        .collect();

    if matched.is_empty() {
        TriageResult::Clear
    } else {
        TriageResult::Alert { matched }
    }
}

pub fn check_patient(patient: &PatientProfile) -> TriageResult {
    scan_red_flags(&patient.triage_text())
}
