//! Turns milligrams into what actually gets dispensed.
//!
//! The confirmed amount can differ from the requested one because of
//! unit rounding; callers surface both.

use serde::Serialize;

use crate::catalog::DosageForm;

/// Per-form unit details, flattened into the dose-basis block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UnitDetails {
    Tablet {
        units_per_dose: u32,
        per_unit_mg: u32,
        confirmed_total_mg: u32,
    },
    Liquid {
        ml_per_dose: f64,
        mg_per_ml: f64,
        confirmed_total_mg: u32,
    },
    Other {
        confirmed_total_mg: u32,
    },
}

impl UnitDetails {
    pub fn confirmed_total_mg(&self) -> u32 {
        match self {
            Self::Tablet { confirmed_total_mg, .. }
            | Self::Liquid { confirmed_total_mg, .. }
            | Self::Other { confirmed_total_mg } => *confirmed_total_mg,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoseInstruction {
    pub text: String,
    pub units: UnitDetails,
}

fn round_half_even(x: f64) -> u32 {
    let r = x.round_ties_even();
    if r.is_finite() && r > 0.0 {
        r as u32
    } else {
        0
    }
}

/// Whole tablets, at least one.
pub fn format_tablet_dose(total_mg: u32, unit_mg: u32) -> DoseInstruction {
    let units = if unit_mg > 0 {
        round_half_even(f64::from(total_mg) / f64::from(unit_mg)).max(1)
    } else {
        1
    };
    let confirmed = units * unit_mg;
    DoseInstruction {
        text: format!(
            "{units} tablet{} ({unit_mg}mg each)",
            if units != 1 { "s" } else { "" }
        ),
        units: UnitDetails::Tablet {
            units_per_dose: units,
            per_unit_mg: unit_mg,
            confirmed_total_mg: confirmed,
        },
    }
}

/// Volume rounded to 0.1 mL.
pub fn format_liquid_dose(total_mg: u32, mg_per_ml: f64) -> DoseInstruction {
    let ml = if mg_per_ml > 0.0 {
        (f64::from(total_mg) / mg_per_ml * 10.0).round() / 10.0
    } else {
        0.0
    };
    let confirmed = round_half_even(ml * mg_per_ml);
    DoseInstruction {
        text: format!("{ml:.1} mL (≈{confirmed}mg)"),
        units: UnitDetails::Liquid {
            ml_per_dose: ml,
            mg_per_ml,
            confirmed_total_mg: confirmed,
        },
    }
}

pub fn format_dose(total_mg: u32, form: &DosageForm) -> DoseInstruction {
    match *form {
        DosageForm::Tablet { unit_mg } => format_tablet_dose(total_mg, unit_mg),
        DosageForm::Liquid { mg_per_ml } => format_liquid_dose(total_mg, mg_per_ml),
        DosageForm::Other => DoseInstruction {
            text: format!("{total_mg} mg"),
            units: UnitDetails::Other {
                confirmed_total_mg: total_mg,
            },
        },
    }
}
