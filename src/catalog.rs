//! Fixed OTC catalog.
//!
//! The catalog is an ordered table: selection tie-breaks and alias
//! scanning both walk entries in declaration order, so the order of
//! `standard_entries()` is part of the behavior.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum CatalogError {
    #[error("Unknown medication key: {0}")]
    UnknownDrug(String),

    #[error("Duplicate catalog entry: {0}")]
    DuplicateEntry(&'static str),

    #[error("Invalid catalog entry {key}: {reason}")]
    InvalidEntry { key: &'static str, reason: String },

    #[error("Catalog has no entries")]
    Empty,
}

/// Generates a key enum with `as_str` and `FromStr`.
macro_rules! key_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = CatalogError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(CatalogError::UnknownDrug(s.into())),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

key_enum!(DrugKey {
    Acetaminophen => "acetaminophen",
    Ibuprofen => "ibuprofen",
    Dextromethorphan => "dextromethorphan",
    Guaifenesin => "guaifenesin",
    Cetirizine => "cetirizine",
    Loratadine => "loratadine",
    Famotidine => "famotidine",
    Meclizine => "meclizine",
    CalciumCarbonate => "calcium_carbonate",
});

/// How one unit of the product is measured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum DosageForm {
    Tablet { unit_mg: u32 },
    Liquid { mg_per_ml: f64 },
    Other,
}

impl DosageForm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tablet { .. } => "tablet",
            Self::Liquid { .. } => "liquid",
            Self::Other => "other",
        }
    }
}

/// One immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedicationProfile {
    pub key: DrugKey,
    pub generic: &'static str,
    /// Ordered; the first brand is the display brand.
    pub brands: &'static [&'static str],
    /// Lower-cased names recognised in free-text notes.
    pub aliases: &'static [&'static str],
    pub form: DosageForm,
    pub single_dose_cap_mg: u32,
    pub max_daily_mg: Option<u32>,
    pub symptoms: &'static [&'static str],
    pub avoid_if: &'static [&'static str],
    pub frequency_hours: u32,
    pub frequency_label: &'static str,
    pub side_effects: &'static str,
}

impl MedicationProfile {
    pub fn brand(&self) -> &'static str {
        self.brands.first().copied().unwrap_or(self.generic)
    }

    /// "Brand (Generic)" as shown to the user.
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.brand(), self.generic)
    }

    /// True if the generic name or any brand appears in `allergy_text`
    /// (already lower-cased), or any alias appears there as a whole word.
    pub fn matches_allergy(&self, allergy_text: &str) -> bool {
        allergy_text.contains(&self.generic.to_lowercase())
            || self
                .brands
                .iter()
                .any(|b| allergy_text.contains(&b.to_lowercase()))
            || self
                .aliases
                .iter()
                .any(|alias| contains_word(allergy_text, alias))
    }

    /// True if any contraindication keyword appears in `condition_text`.
    pub fn is_contraindicated(&self, condition_text: &str) -> bool {
        self.avoid_if.iter().any(|term| condition_text.contains(term))
    }

    /// Number of symptom keywords present in `symptom_text`.
    pub fn symptom_score(&self, symptom_text: &str) -> i32 {
        self.symptoms
            .iter()
            .filter(|kw| symptom_text.contains(*kw))
            .count() as i32
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let invalid = |reason: &str| CatalogError::InvalidEntry {
            key: self.key.as_str(),
            reason: reason.to_string(),
        };

        if self.single_dose_cap_mg == 0 {
            return Err(invalid("single-dose cap must be positive"));
        }
        match self.form {
            DosageForm::Tablet { unit_mg } if unit_mg == 0 => {
                return Err(invalid("tablet strength must be positive"));
            }
            DosageForm::Liquid { mg_per_ml } if !(mg_per_ml.is_finite() && mg_per_ml > 0.0) => {
                return Err(invalid("liquid concentration must be positive"));
            }
            _ => {}
        }
        if let Some(daily) = self.max_daily_mg {
            if daily < self.single_dose_cap_mg {
                return Err(invalid("daily cap is below the single-dose cap"));
            }
        }
        if self.brands.is_empty() {
            return Err(invalid("at least one brand is required"));
        }
        Ok(())
    }
}

/// `term` occurs in `text` bounded by non-alphanumerics. Keeps short
/// aliases like "dm" from matching inside unrelated words.
fn contains_word(text: &str, term: &str) -> bool {
    text.match_indices(term).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + term.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Ordered, immutable medication table.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<MedicationProfile>,
}

impl Catalog {
    /// Build a catalog, checking per-entry invariants and key uniqueness.
    pub fn from_entries(entries: Vec<MedicationProfile>) -> Result<Self, CatalogError> {
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }
        for (i, entry) in entries.iter().enumerate() {
            entry.validate()?;
            if entries[..i].iter().any(|e| e.key == entry.key) {
                return Err(CatalogError::DuplicateEntry(entry.key.as_str()));
            }
        }
        Ok(Self { entries })
    }

    /// The built-in catalog, shared process-wide.
    pub fn standard() -> &'static Catalog {
        &STANDARD
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &MedicationProfile> {
        self.entries.iter()
    }

    pub fn get(&self, key: DrugKey) -> Option<&MedicationProfile> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn lookup(&self, key: &str) -> Result<&MedicationProfile, CatalogError> {
        let key: DrugKey = key.parse()?;
        self.get(key)
            .ok_or_else(|| CatalogError::UnknownDrug(key.as_str().into()))
    }

    /// First declared entry. Never empty, `from_entries` rejects that.
    pub fn first(&self) -> &MedicationProfile {
        &self.entries[0]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

static STANDARD: LazyLock<Catalog> = LazyLock::new(|| Catalog {
    entries: standard_entries(),
});

fn standard_entries() -> Vec<MedicationProfile> {
    vec![
        MedicationProfile {
            key: DrugKey::Acetaminophen,
            generic: "Acetaminophen",
            brands: &["Tylenol", "Equate Acetaminophen"],
            aliases: &["acetaminophen", "tylenol", "paracetamol"],
            form: DosageForm::Tablet { unit_mg: 500 },
            single_dose_cap_mg: 1000,
            max_daily_mg: Some(3000),
            symptoms: &["fever", "headache", "pain", "sore throat", "toothache"],
            avoid_if: &[],
            frequency_hours: 6,
            frequency_label: "every 6 hours as needed",
            side_effects: "May cause nausea or upset stomach if taken on an empty stomach.",
        },
        MedicationProfile {
            key: DrugKey::Ibuprofen,
            generic: "Ibuprofen",
            brands: &["Advil", "Motrin"],
            aliases: &["ibuprofen", "advil", "motrin"],
            form: DosageForm::Tablet { unit_mg: 200 },
            single_dose_cap_mg: 800,
            max_daily_mg: Some(1200),
            symptoms: &["muscle aches", "joint pain", "sprain", "back pain", "inflammation"],
            avoid_if: &["ulcer", "gi bleed", "kidney", "renal", "pregnan"],
            frequency_hours: 6,
            frequency_label: "every 6–8 hours with food as needed",
            side_effects: "May cause stomach irritation; take with food and avoid if you have ulcers or kidney issues.",
        },
        MedicationProfile {
            key: DrugKey::Dextromethorphan,
            generic: "Dextromethorphan",
            brands: &["Delsym", "Robitussin"],
            aliases: &["dextromethorphan", "delsym", "robitussin dm", "dm"],
            // Delsym polistirex: 30 mg per 5 mL
            form: DosageForm::Liquid { mg_per_ml: 6.0 },
            single_dose_cap_mg: 60,
            max_daily_mg: Some(120),
            symptoms: &["cough", "dry cough"],
            avoid_if: &["maoi", "linezolid", "serotonin"],
            frequency_hours: 12,
            frequency_label: "every 12 hours as needed",
            side_effects: "May cause drowsiness or dizziness; avoid combining with certain antidepressants (MAOIs).",
        },
        MedicationProfile {
            key: DrugKey::Guaifenesin,
            generic: "Guaifenesin",
            brands: &["Mucinex", "Robitussin Chest Congestion"],
            aliases: &["guaifenesin", "mucinex", "robitussin chest congestion"],
            form: DosageForm::Tablet { unit_mg: 200 },
            single_dose_cap_mg: 600,
            max_daily_mg: Some(2400),
            symptoms: &["chest congestion", "productive cough", "mucus"],
            avoid_if: &[],
            frequency_hours: 4,
            frequency_label: "every 4 hours as needed with water",
            side_effects: "May cause nausea; drink plenty of water to help loosen mucus.",
        },
        MedicationProfile {
            key: DrugKey::Cetirizine,
            generic: "Cetirizine",
            brands: &["Zyrtec"],
            aliases: &["cetirizine", "zyrtec"],
            form: DosageForm::Tablet { unit_mg: 10 },
            single_dose_cap_mg: 10,
            max_daily_mg: Some(10),
            symptoms: &["allergies", "sneezing", "runny nose", "itchy eyes"],
            avoid_if: &[],
            frequency_hours: 24,
            frequency_label: "once daily",
            side_effects: "May cause mild drowsiness in some people.",
        },
        MedicationProfile {
            key: DrugKey::Loratadine,
            generic: "Loratadine",
            brands: &["Claritin"],
            aliases: &["loratadine", "claritin"],
            form: DosageForm::Tablet { unit_mg: 10 },
            single_dose_cap_mg: 10,
            max_daily_mg: Some(10),
            symptoms: &["allergies", "sneezing", "runny nose", "itchy eyes"],
            avoid_if: &[],
            frequency_hours: 24,
            frequency_label: "once daily",
            side_effects: "Generally non-drowsy; rare headache or dry mouth.",
        },
        MedicationProfile {
            key: DrugKey::Famotidine,
            generic: "Famotidine",
            brands: &["Pepcid"],
            aliases: &["famotidine", "pepcid"],
            form: DosageForm::Tablet { unit_mg: 10 },
            single_dose_cap_mg: 20,
            max_daily_mg: Some(40),
            symptoms: &["heartburn", "acid reflux", "indigestion"],
            avoid_if: &[],
            frequency_hours: 12,
            frequency_label: "once or twice daily as needed",
            side_effects: "Well tolerated; occasional headache or dizziness.",
        },
        MedicationProfile {
            key: DrugKey::Meclizine,
            generic: "Meclizine",
            brands: &["Dramamine Less Drowsy", "Bonine"],
            aliases: &["meclizine", "bonine", "dramamine less drowsy"],
            form: DosageForm::Tablet { unit_mg: 25 },
            single_dose_cap_mg: 25,
            max_daily_mg: Some(50),
            symptoms: &["nausea", "motion sickness", "vertigo"],
            avoid_if: &[],
            frequency_hours: 24,
            frequency_label: "once daily as needed (30–60 minutes before travel)",
            side_effects: "May cause drowsiness; avoid driving until you know how you respond.",
        },
        MedicationProfile {
            key: DrugKey::CalciumCarbonate,
            generic: "Calcium Carbonate",
            brands: &["Tums"],
            aliases: &["calcium carbonate", "tums"],
            form: DosageForm::Tablet { unit_mg: 500 },
            single_dose_cap_mg: 1000,
            max_daily_mg: Some(3000),
            symptoms: &["heartburn", "sour stomach", "indigestion"],
            avoid_if: &[],
            frequency_hours: 4,
            frequency_label: "as needed per label",
            side_effects: "May cause constipation if used frequently.",
        },
    ]
}
