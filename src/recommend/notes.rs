//! Free-text note parser: "I took X, N hours ago, it didn't help".
//!
//! Three independent extractions over the lower-cased note. The result
//! is computed once per request and shared by the selector and the
//! timing-advice text.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::catalog::{Catalog, DrugKey};

static HOURS_AGO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b([0-9]+|one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve)\s*(hour|hr|hrs|hours)\s*(ago|back)?\b",
    )
    .expect("Invalid hours-ago regex")
});

static NO_RELIEF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(no\s*(relief|difference|effect)|did(?:n['’]t| not)\s*(work|help)|not\s*helping|ineffective|still\s*(in\s*pain|cough(ing)?))",
    )
    .expect("Invalid no-relief regex")
});

/// What the notes say about a medication already taken.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecentMedicationSignal {
    pub drug: Option<DrugKey>,
    pub hours_ago: Option<u32>,
    pub no_relief: bool,
}

impl RecentMedicationSignal {
    pub fn is_empty(&self) -> bool {
        self.drug.is_none() && self.hours_ago.is_none() && !self.no_relief
    }
}

/// Parse all three signals from a note. Empty or unrecognised text
/// yields the empty signal.
pub fn parse_notes(catalog: &Catalog, notes: &str) -> RecentMedicationSignal {
    if notes.trim().is_empty() {
        return RecentMedicationSignal::default();
    }
    let text = notes.to_lowercase();

    RecentMedicationSignal {
        drug: detect_drug(catalog, &text),
        hours_ago: parse_hours_ago(&text),
        no_relief: NO_RELIEF.is_match(&text),
    }
}

/// First "N hour(s) [ago]" expression, digits or "one".."twelve".
pub fn parse_hours_ago(text: &str) -> Option<u32> {
    let caps = HOURS_AGO.captures(text)?;
    let raw = caps.get(1)?.as_str().to_lowercase();
    if raw.bytes().all(|b| b.is_ascii_digit()) {
        // Absurdly large counts saturate rather than drop the signal.
        return Some(raw.parse::<u32>().unwrap_or(u32::MAX));
    }
    word_to_number(&raw)
}

fn word_to_number(word: &str) -> Option<u32> {
    let n = match word {
        "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        _ => return None,
    };
    Some(n)
}

/// First catalog entry (declaration order) with an alias in `text`.
fn detect_drug(catalog: &Catalog, text: &str) -> Option<DrugKey> {
    catalog
        .iter()
        .find(|entry| entry.aliases.iter().any(|alias| text.contains(alias)))
        .map(|entry| entry.key)
}
