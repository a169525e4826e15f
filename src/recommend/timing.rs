use crate::catalog::Catalog;

use super::notes::RecentMedicationSignal;

/// Advice about a medication the notes say was already taken.
/// `None` when no drug was mentioned.
pub fn build_timing_advice(catalog: &Catalog, signal: &RecentMedicationSignal) -> Option<String> {
    let entry = catalog.get(signal.drug?)?;

    let mut parts = vec![match signal.hours_ago {
        Some(hours) => format!(
            "You reported taking {} ({}) about {hours} hour(s) ago.",
            entry.brand(),
            entry.generic
        ),
        None => format!(
            "You reported taking {} ({}) recently.",
            entry.brand(),
            entry.generic
        ),
    }];

    if signal.no_relief {
        parts.push("You also reported little or no relief.".to_string());
    }

    if let Some(hours) = signal.hours_ago {
        let interval = entry.frequency_hours;
        if interval > 0 && hours < interval {
            parts.push(format!(
                "Wait at least {} more hour(s) before another dose of that same medication.",
                interval - hours
            ));
        }
    }

    Some(parts.join(" "))
}
