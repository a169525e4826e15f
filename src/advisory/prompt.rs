use super::types::AdvisoryRequest;

/// System prompt for the advisory model.
pub const ADVISORY_SYSTEM_PROMPT: &str = r#"You are a cautious U.S. over-the-counter (OTC) medication assistant. SAFETY FIRST.

RULES:
1) A rule-based engine has already selected a medication and a maximum single dose.
2) You MUST NOT exceed max_dose_mg. You may propose the same or a lower dose.
3) Use U.S. OTC context only. Never propose prescription-only drugs.
4) If you would choose a different OTC medication, name its drug_key and explain why in rationale.
5) Keep rationale to one or two short sentences, without calculations.

Return ONLY one JSON object:
{"drug_key": "<catalog key>", "rationale": "<short text>", "total_mg": <number>}"#;

/// Build the user prompt. The patient block is JSON so the model sees
/// exactly the validated fields.
pub fn build_advisory_prompt(request: &AdvisoryRequest) -> String {
    let patient = serde_json::to_string_pretty(&request.patient)
        .unwrap_or_else(|_| "{}".to_string());

    format!(
        "Patient profile:\n{patient}\n\n\
         Selected OTC (do not exceed):\n\
         - drug_key: {}\n\
         - brand: {}\n\
         - generic: {}\n\
         - form: {}\n\
         - frequency: {}\n\
         - max_dose_mg: {}\n",
        request.drug_key,
        request.brand,
        request.generic,
        request.form,
        request.frequency_label,
        request.max_dose_mg,
    )
}
