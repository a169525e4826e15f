//! Conservative single-dose calculator.
//!
//! Body-surface-area scaling is a rough proportional adjustment for the
//! two analgesics, not a clinical dosing formula. Every other catalog
//! entry is a fixed label dose.

use crate::catalog::{DrugKey, MedicationProfile};
use crate::models::PatientProfile;

/// Doses are rounded to this increment.
pub const DOSE_INCREMENT_MG: u32 = 50;

const ELDERLY_AGE: i32 = 65;
const ELDERLY_FACTOR: f64 = 0.8;
const HEPATIC_FACTOR: f64 = 0.8;
const RENAL_FACTOR: f64 = 0.8;
const GI_FACTOR: f64 = 0.7;

const HEPATIC_TERMS: &[&str] = &["liver", "hepatic"];
const RENAL_TERMS: &[&str] = &["kidney", "renal"];
const GI_TERMS: &[&str] = &["ulcer", "gi bleed"];

/// Mosteller body surface area in m².
pub fn bsa_mosteller(height_cm: f64, weight_kg: f64) -> f64 {
    ((height_cm * weight_kg) / 3600.0).sqrt()
}

/// Practical adult per-dose baseline (mg per m²) for body-scaled drugs.
pub fn body_scaled_baseline(key: DrugKey) -> Option<f64> {
    match key {
        DrugKey::Acetaminophen => Some(650.0),
        DrugKey::Ibuprofen => Some(400.0),
        _ => None,
    }
}

/// Hard per-dose ceiling applied by the calculator, independent of the
/// catalog's own single-dose cap.
pub fn absolute_single_dose_cap(key: DrugKey) -> Option<f64> {
    match key {
        DrugKey::Acetaminophen => Some(1000.0),
        DrugKey::Ibuprofen => Some(800.0),
        _ => None,
    }
}

pub fn age_adjustment_factor(age: Option<i32>) -> f64 {
    match age {
        Some(a) if a >= ELDERLY_AGE => ELDERLY_FACTOR,
        _ => 1.0,
    }
}

/// Multiplicative reduction for case-folded condition text. Keyword
/// groups compound.
pub fn condition_adjustment_factor(condition_text: &str) -> f64 {
    let has_any = |terms: &[&str]| terms.iter().any(|t| condition_text.contains(t));

    let mut factor = 1.0;
    if has_any(HEPATIC_TERMS) {
        factor *= HEPATIC_FACTOR;
    }
    if has_any(RENAL_TERMS) {
        factor *= RENAL_FACTOR;
    }
    if has_any(GI_TERMS) {
        factor *= GI_FACTOR;
    }
    factor
}

/// Round half-to-even to the nearest dose increment.
fn round_to_increment(mg: f64) -> u32 {
    let step = f64::from(DOSE_INCREMENT_MG);
    let rounded = (mg / step).round_ties_even() * step;
    if rounded.is_finite() && rounded > 0.0 {
        rounded as u32
    } else {
        0
    }
}

/// BSA-scaled, age/condition-adjusted, hard-capped dose in mg, always a
/// multiple of 50. Drugs without a body-scaled baseline return 0.
pub fn compute_conservative_dose(
    key: DrugKey,
    height_cm: f64,
    weight_kg: f64,
    age: Option<i32>,
    condition_text: &str,
) -> u32 {
    let Some(baseline) = body_scaled_baseline(key) else {
        return 0;
    };
    let bsa = bsa_mosteller(height_cm, weight_kg);
    let adjusted =
        baseline * bsa * age_adjustment_factor(age) * condition_adjustment_factor(condition_text);
    let capped = match absolute_single_dose_cap(key) {
        Some(cap) => adjusted.min(cap),
        None => adjusted,
    };
    round_to_increment(capped)
}

/// The dose the rest of the pipeline starts from, never above the
/// catalog's single-dose cap.
pub fn suggested_single_dose(entry: &MedicationProfile, patient: &PatientProfile) -> u32 {
    let cap = entry.single_dose_cap_mg;
    if body_scaled_baseline(entry.key).is_none() {
        return cap;
    }

    let computed = compute_conservative_dose(
        entry.key,
        patient.dose_height_cm(),
        patient.dose_weight_kg(),
        patient.age,
        &patient.condition_text(),
    );
    if computed == 0 {
        return DOSE_INCREMENT_MG.min(cap);
    }
    computed.min(cap)
}
