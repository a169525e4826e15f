//! One request in, one decision out.
//!
//! Stages run in a fixed order: validate, triage, parse notes, select,
//! dose, safety check, format, optional advisory. The note signal is
//! parsed once and shared by the selector and the timing advice.

use std::sync::Arc;

use crate::advisory::{AdvisoryClient, AdvisoryProposal, AdvisoryRequest};
use crate::catalog::{Catalog, DrugKey, MedicationProfile};
use crate::models::{PatientProfile, ValidationError};

use super::dose::suggested_single_dose;
use super::format::{format_dose, DoseInstruction};
use super::notes::parse_notes;
use super::safety::{suggest_alternatives, validate_dose_safety, Alternative, SafetyReport};
use super::selector::select_medication;
use super::timing::build_timing_advice;
use super::triage::{check_patient, TriageAlert, TriageResult};
use super::types::{
    AdvisoryNote, Decision, DoseBasis, Recommendation, SafetyValidation, DOSE_POLICY,
    MEDICAL_DISCLAIMER,
};

/// Stateless apart from the read-only catalog and the optional advisor,
/// so one instance serves any number of concurrent requests.
#[derive(Clone)]
pub struct RecommendationEngine {
    catalog: &'static Catalog,
    advisor: Option<Arc<dyn AdvisoryClient>>,
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self::new(Catalog::standard())
    }
}

impl RecommendationEngine {
    pub fn new(catalog: &'static Catalog) -> Self {
        Self {
            catalog,
            advisor: None,
        }
    }

    pub fn with_advisor(mut self, advisor: Arc<dyn AdvisoryClient>) -> Self {
        self.advisor = Some(advisor);
        self
    }

    pub fn advisor(&self) -> Option<&Arc<dyn AdvisoryClient>> {
        self.advisor.as_ref()
    }

    pub fn catalog(&self) -> &'static Catalog {
        self.catalog
    }

    /// Run the full pipeline. Only an invalid profile is an error; every
    /// other failure resolves to a deterministic fallback.
    pub fn recommend(&self, patient: &PatientProfile) -> Result<Decision, ValidationError> {
        patient.validate()?;

        if let TriageResult::Alert { matched } = check_patient(patient) {
            tracing::info!(flags = matched.len(), "Red flag detected, returning triage alert");
            return Ok(Decision::Triage(TriageAlert::default()));
        }

        let signal = parse_notes(self.catalog, patient.notes_text());
        let selection = select_medication(self.catalog, patient, &signal);

        // The fallback key may be absent from a custom catalog.
        let entry = self.catalog.get(selection.key).unwrap_or_else(|| {
            tracing::warn!(drug = %selection.key, "Selected drug missing from catalog");
            self.catalog.first()
        });

        let suggested = suggested_single_dose(entry, patient);
        let report = validate_dose_safety(entry.key, suggested, patient);

        tracing::info!(
            drug = %entry.key,
            score = ?selection.score,
            fallback = selection.is_fallback(),
            notes_signal = !signal.is_empty(),
            suggested_mg = suggested,
            validated_mg = report.validated_mg,
            warnings = report.warnings.len(),
            "Dose computed"
        );

        let alternatives = if report.is_safe() {
            Vec::new()
        } else {
            suggest_alternatives(self.catalog, patient)
        };

        let (instruction, advisory) = match self.consult_advisor(patient, entry, &report) {
            Some((mg, note)) => (format_dose(mg, &entry.form), Some(note)),
            None => (format_dose(report.validated_mg, &entry.form), None),
        };

        let timing_advice = build_timing_advice(self.catalog, &signal);

        Ok(Decision::Recommendation(Box::new(self.assemble(
            entry,
            suggested,
            &report,
            instruction,
            alternatives,
            advisory,
            timing_advice,
        ))))
    }

    /// Ask the advisor for a second opinion. Returns the amount to format
    /// (never above the validated dose) and the note to attach, or `None`
    /// when there is no advisor or its answer is unusable.
    fn consult_advisor(
        &self,
        patient: &PatientProfile,
        entry: &MedicationProfile,
        report: &SafetyReport,
    ) -> Option<(u32, AdvisoryNote)> {
        let advisor = self.advisor.as_ref()?;
        let request = AdvisoryRequest::new(patient, entry, report.validated_mg);

        let proposal = match advisor.advise(&request) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(model = advisor.model(), error = %e, "Advisory unavailable, using rule-based dose");
                return None;
            }
        };

        merge_proposal(self.catalog, entry.key, report.validated_mg, proposal)
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        &self,
        entry: &MedicationProfile,
        suggested: u32,
        report: &SafetyReport,
        instruction: DoseInstruction,
        alternatives: Vec<Alternative>,
        advisory: Option<AdvisoryNote>,
        timing_advice: Option<String>,
    ) -> Recommendation {
        Recommendation {
            drug_key: entry.key,
            drug_name: entry.display_name(),
            frequency: format!("{} • {}", instruction.text, entry.frequency_label),
            dosage: instruction.text,
            side_effects: entry.side_effects,
            timing_advice,
            safety_validation: SafetyValidation::from(report),
            alternatives,
            medical_disclaimer: MEDICAL_DISCLAIMER,
            dose_basis: DoseBasis {
                suggested_single_dose_mg: suggested,
                validated_dose_mg: report.validated_mg,
                single_dose_cap_mg: entry.single_dose_cap_mg,
                max_daily_mg: entry.max_daily_mg,
                form: entry.form.as_str(),
                units: instruction.units,
                policy: DOSE_POLICY,
                advisory_used: advisory.is_some(),
                safety_checks_passed: report.is_safe(),
            },
            advisory,
        }
    }
}

/// Fold an advisor proposal into the rule-based result. The drug never
/// changes and the amount is capped at `validated_mg`.
fn merge_proposal(
    catalog: &Catalog,
    selected: DrugKey,
    validated_mg: u32,
    proposal: AdvisoryProposal,
) -> Option<(u32, AdvisoryNote)> {
    let capped = proposal.total_mg.min(f64::from(validated_mg)).floor();
    if capped < 1.0 {
        tracing::warn!("Advisory dose below 1 mg, ignoring");
        return None;
    }
    let mg = capped as u32;

    let suggested_drug = proposal
        .drug_key
        .as_deref()
        .and_then(|raw| catalog.lookup(raw).ok())
        .map(|suggested| suggested.key)
        .filter(|key| *key != selected);
    if let Some(other) = suggested_drug {
        tracing::info!(selected = %selected, suggested = %other, "Advisor preferred a different drug");
    }

    Some((
        mg,
        AdvisoryNote {
            rationale: proposal.rationale,
            suggested_drug,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::MockAdvisor;
    use crate::recommend::format::UnitDetails;

    fn patient(symptoms: &[&str]) -> PatientProfile {
        PatientProfile {
            symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn recommend(p: &PatientProfile) -> Recommendation {
        match RecommendationEngine::default().recommend(p).unwrap() {
            Decision::Recommendation(r) => *r,
            Decision::Triage(_) => panic!("unexpected triage alert"),
        }
    }

    #[test]
    fn elderly_headache_gets_reduced_acetaminophen() {
        let mut p = patient(&["headache"]);
        p.age = Some(70);
        p.height_cm = Some(165.0);
        p.weight_kg = Some(60.0);

        let r = recommend(&p);
        assert_eq!(r.drug_key, DrugKey::Acetaminophen);
        assert_eq!(r.dose_basis.suggested_single_dose_mg, 850);
        assert_eq!(r.dose_basis.validated_dose_mg, 750);
        assert!(r.safety_validation.dose_reduced);
        assert!(r.safety_validation.is_safe);
        assert_eq!(r.safety_validation.warning, "Dose validated and safe");
        assert!(r.alternatives.is_empty());
        assert_eq!(r.drug_name, "Tylenol (Acetaminophen)");
    }

    #[test]
    fn high_pain_favours_ibuprofen() {
        let mut p = patient(&["muscle aches"]);
        p.pain_level = Some(9);

        let r = recommend(&p);
        assert_eq!(r.drug_key, DrugKey::Ibuprofen);
        assert_eq!(r.dose_basis.suggested_single_dose_mg, 750);
        assert_eq!(r.dose_basis.validated_dose_mg, 600);
        assert_eq!(r.dosage, "3 tablets (200mg each)");
        assert!(!r.safety_validation.is_safe);
        assert!(r.safety_validation.warning.contains("High ibuprofen dose"));
        // pain 9 surfaces the alternating option
        assert!(r.alternatives.iter().any(|a| a.drug == "combination"));
    }

    #[test]
    fn failed_acetaminophen_switches_to_ibuprofen() {
        let mut p = patient(&["headache"]);
        p.notes = Some("took Tylenol 2 hours ago, no relief".into());

        let r = recommend(&p);
        assert_eq!(r.drug_key, DrugKey::Ibuprofen);
        let advice = r.timing_advice.unwrap();
        assert!(advice.contains("2 hour(s) ago"));
        assert!(advice.contains("little or no relief"));
    }

    #[test]
    fn kidney_disease_excludes_ibuprofen() {
        let mut p = patient(&["muscle aches"]);
        p.conditions = vec!["kidney disease".into()];

        let r = recommend(&p);
        assert_ne!(r.drug_key, DrugKey::Ibuprofen);
        assert_eq!(r.dose_basis.validated_dose_mg, 400);
        assert!(r.safety_validation.warning.contains("Kidney/liver"));
    }

    #[test]
    fn child_dose_clamped_not_floored() {
        let mut p = patient(&["headache"]);
        p.age = Some(10);
        p.weight_kg = Some(30.0);

        let r = recommend(&p);
        assert_eq!(r.dose_basis.validated_dose_mg, 400);
        assert!(r.safety_validation.warning.contains("Pediatric"));
        assert!(!r.safety_validation.warning.contains("too low"));
    }

    #[test]
    fn red_flag_returns_only_alert() {
        let mut p = patient(&["Crushing CHEST PAIN since morning"]);
        p.age = Some(40);
        p.pain_level = Some(10);

        let decision = RecommendationEngine::default().recommend(&p).unwrap();
        assert!(decision.is_triage());
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["triage_alert"], "See a doctor");
        assert!(json.get("dosage").is_none());
        assert!(json.get("drug_key").is_none());
    }

    #[test]
    fn invalid_profile_is_rejected() {
        let mut p = patient(&["headache"]);
        p.age = Some(200);
        assert!(RecommendationEngine::default().recommend(&p).is_err());
        assert!(RecommendationEngine::default().recommend(&patient(&[])).is_err());
    }

    #[test]
    fn no_timing_advice_without_notes() {
        let r = recommend(&patient(&["cough"]));
        assert_eq!(r.drug_key, DrugKey::Dextromethorphan);
        assert!(r.timing_advice.is_none());
        assert!(matches!(r.dose_basis.units, UnitDetails::Liquid { .. }));
    }

    #[test]
    fn dose_ordering_holds_across_profiles() {
        let symptom_sets: &[&[&str]] = &[
            &["headache"],
            &["muscle aches"],
            &["cough"],
            &["sneezing"],
            &["heartburn"],
            &["nausea"],
            &["mucus"],
        ];
        let ages = [None, Some(5), Some(15), Some(40), Some(80)];
        let weights = [None, Some(20.0), Some(70.0), Some(150.0)];
        let conditions: &[&[&str]] = &[&[], &["liver disease"], &["stomach ulcer"]];

        for symptoms in symptom_sets {
            for age in ages {
                for weight in weights {
                    for conds in conditions {
                        let mut p = patient(symptoms);
                        p.age = age;
                        p.weight_kg = weight;
                        p.conditions = conds.iter().map(|s| s.to_string()).collect();

                        let r = recommend(&p);
                        let b = &r.dose_basis;
                        assert!(b.validated_dose_mg <= b.suggested_single_dose_mg);
                        assert!(b.suggested_single_dose_mg <= b.single_dose_cap_mg);
                        if let Some(daily) = b.max_daily_mg {
                            assert!(b.single_dose_cap_mg <= daily);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn frequency_combines_dose_and_label() {
        let r = recommend(&patient(&["sneezing"]));
        assert_eq!(r.drug_key, DrugKey::Cetirizine);
        assert_eq!(r.dosage, "1 tablet (10mg each)");
        assert!(r.frequency.starts_with("1 tablet (10mg each) • "));
    }

    #[test]
    fn advisory_cannot_raise_dose() {
        let mock = Arc::new(MockAdvisor::new(
            r#"{"drug_key": "ibuprofen", "rationale": "Stronger relief", "total_mg": 4000}"#,
        ));
        let engine = RecommendationEngine::default().with_advisor(mock.clone());

        let decision = engine.recommend(&patient(&["headache"])).unwrap();
        let r = decision.recommendation().unwrap();
        assert_eq!(mock.calls(), 1);
        assert_eq!(r.drug_key, DrugKey::Acetaminophen);
        assert_eq!(r.dose_basis.validated_dose_mg, 750);
        assert!(r.dose_basis.advisory_used);
        let note = r.advisory.as_ref().unwrap();
        assert_eq!(note.suggested_drug, Some(DrugKey::Ibuprofen));
        assert_eq!(note.rationale.as_deref(), Some("Stronger relief"));
    }

    #[test]
    fn advisory_can_lower_dose() {
        let mock = Arc::new(MockAdvisor::new(r#"{"total_mg": 500}"#));
        let engine = RecommendationEngine::default().with_advisor(mock);

        let decision = engine.recommend(&patient(&["headache"])).unwrap();
        let r = decision.recommendation().unwrap();
        assert_eq!(r.dosage, "1 tablet (500mg each)");
        assert_eq!(r.dose_basis.units.confirmed_total_mg(), 500);
        assert!(r.advisory.as_ref().unwrap().suggested_drug.is_none());
    }

    #[test]
    fn failing_advisor_falls_back_to_rules() {
        let engine = RecommendationEngine::default()
            .with_advisor(Arc::new(MockAdvisor::unreachable()));
        let with = engine.recommend(&patient(&["headache"])).unwrap();
        let without = RecommendationEngine::default()
            .recommend(&patient(&["headache"]))
            .unwrap();

        let with = with.recommendation().unwrap();
        let without = without.recommendation().unwrap();
        assert!(!with.dose_basis.advisory_used);
        assert!(with.advisory.is_none());
        assert_eq!(with.dosage, without.dosage);
    }

    #[test]
    fn malformed_advisory_is_ignored() {
        let engine = RecommendationEngine::default()
            .with_advisor(Arc::new(MockAdvisor::new("I think two tablets")));
        let decision = engine.recommend(&patient(&["headache"])).unwrap();
        assert!(!decision.recommendation().unwrap().dose_basis.advisory_used);
    }

    #[test]
    fn triage_skips_advisor() {
        let mock = Arc::new(MockAdvisor::new(r#"{"total_mg": 500}"#));
        let engine = RecommendationEngine::default().with_advisor(mock.clone());
        let decision = engine.recommend(&patient(&["suicidal thoughts"])).unwrap();
        assert!(decision.is_triage());
        assert_eq!(mock.calls(), 0);
    }

    #[test]
    fn merge_ignores_sub_milligram_proposal() {
        let proposal = AdvisoryProposal {
            drug_key: None,
            rationale: None,
            total_mg: 0.4,
        };
        assert!(merge_proposal(Catalog::standard(), DrugKey::Acetaminophen, 750, proposal).is_none());
    }

    #[test]
    fn merge_drops_drug_outside_catalog() {
        let proposal = AdvisoryProposal {
            drug_key: Some("oxycodone".into()),
            rationale: Some("Stronger".into()),
            total_mg: 500.0,
        };
        let (mg, note) =
            merge_proposal(Catalog::standard(), DrugKey::Acetaminophen, 750, proposal).unwrap();
        assert_eq!(mg, 500);
        assert!(note.suggested_drug.is_none());
    }

    #[test]
    fn recommendation_json_shape() {
        let decision = RecommendationEngine::default()
            .recommend(&patient(&["headache"]))
            .unwrap();
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["drug_key"], "acetaminophen");
        assert_eq!(json["dose_basis"]["form"], "tablet");
        assert_eq!(json["dose_basis"]["per_unit_mg"], 500);
        assert_eq!(json["dose_basis"]["advisory_used"], false);
        assert!(json.get("alternatives").is_none());
        assert!(json.get("advisory").is_none());
        assert!(json["medical_disclaimer"].as_str().unwrap().contains("not medical advice"));
    }
}
