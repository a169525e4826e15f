//! Candidate selector: scores every catalog entry against the patient
//! and the parsed notes, then picks one.

use crate::catalog::{Catalog, DrugKey, MedicationProfile};
use crate::models::PatientProfile;

use super::notes::RecentMedicationSignal;

/// Pain level at which the anti-inflammatory gets a bonus.
const HIGH_PAIN_THRESHOLD: i32 = 7;
const HIGH_PAIN_BONUS: i32 = 2;
/// Nudge toward ibuprofen after acetaminophen did not help.
const SUBSTITUTION_BONUS: i32 = 2;
const NO_RELIEF_PENALTY: i32 = 5;

/// Used when every entry is excluded.
pub const FALLBACK_DRUG: DrugKey = DrugKey::Acetaminophen;

/// Why an entry was dropped before scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    Allergy,
    Contraindication,
    RecentDose,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub key: DrugKey,
    /// `None` when the fallback was used.
    pub score: Option<i32>,
}

impl Selection {
    pub fn is_fallback(&self) -> bool {
        self.score.is_none()
    }
}

/// Per-request text views the scorer needs, folded once.
struct ScoringContext<'a> {
    symptoms: String,
    allergies: String,
    conditions: String,
    pain_level: Option<i32>,
    signal: &'a RecentMedicationSignal,
    recent_interval: Option<u32>,
}

pub fn select_medication(
    catalog: &Catalog,
    patient: &PatientProfile,
    signal: &RecentMedicationSignal,
) -> Selection {
    let ctx = ScoringContext {
        symptoms: patient.symptom_text(),
        allergies: patient.allergy_text(),
        conditions: patient.condition_text(),
        pain_level: patient.pain_level,
        signal,
        recent_interval: signal
            .drug
            .and_then(|k| catalog.get(k))
            .map(|e| e.frequency_hours),
    };

    let mut best: Option<(DrugKey, i32)> = None;
    for entry in catalog.iter() {
        let score = match score_entry(entry, &ctx) {
            Ok(score) => score,
            Err(reason) => {
                tracing::debug!(drug = %entry.key, ?reason, "Candidate excluded");
                continue;
            }
        };
        // Strictly greater: the earlier entry keeps ties.
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((entry.key, score));
        }
    }

    match best {
        Some((key, score)) => Selection {
            key,
            score: Some(score),
        },
        None => {
            tracing::info!(drug = %FALLBACK_DRUG, "All candidates excluded, using fallback");
            Selection {
                key: FALLBACK_DRUG,
                score: None,
            }
        }
    }
}

fn score_entry(entry: &MedicationProfile, ctx: &ScoringContext<'_>) -> Result<i32, Exclusion> {
    if entry.matches_allergy(&ctx.allergies) {
        return Err(Exclusion::Allergy);
    }
    if entry.is_contraindicated(&ctx.conditions) {
        return Err(Exclusion::Contraindication);
    }

    let is_recent = ctx.signal.drug == Some(entry.key);
    if is_recent {
        let too_soon = match (ctx.signal.hours_ago, ctx.recent_interval) {
            (Some(hours), Some(interval)) => interval > 0 && hours < interval,
            _ => false,
        };
        if ctx.signal.no_relief || too_soon {
            return Err(Exclusion::RecentDose);
        }
    }

    let mut score = entry.symptom_score(&ctx.symptoms);

    if entry.key == DrugKey::Ibuprofen && ctx.pain_level.is_some_and(|p| p >= HIGH_PAIN_THRESHOLD) {
        score += HIGH_PAIN_BONUS;
    }
    if entry.key == DrugKey::Ibuprofen
        && ctx.signal.no_relief
        && ctx.signal.drug == Some(DrugKey::Acetaminophen)
    {
        score += SUBSTITUTION_BONUS;
    }
    if ctx.signal.no_relief && is_recent {
        score -= NO_RELIEF_PENALTY;
    }

    Ok(score)
}
