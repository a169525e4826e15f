use serde::Deserialize;

use super::types::AdvisoryProposal;
use super::AdvisoryError;

/// Parse the model's answer into a proposal.
///
/// Accepts a bare JSON object or one wrapped in a ```json fence, in the
/// flat shape `{drug_key, rationale, total_mg}` or the nested
/// `{selected_medication: {drug_key, reasoning}, dosing: {total_mg}}`.
pub fn parse_advisory_response(response: &str) -> Result<AdvisoryProposal, AdvisoryError> {
    let json_str = extract_json(response)?;

    #[derive(Deserialize)]
    struct RawSelection {
        drug_key: Option<String>,
        reasoning: Option<String>,
    }

    #[derive(Deserialize)]
    struct RawDosing {
        total_mg: Option<f64>,
    }

    #[derive(Deserialize)]
    struct RawResponse {
        drug_key: Option<String>,
        rationale: Option<String>,
        total_mg: Option<f64>,
        selected_medication: Option<RawSelection>,
        dosing: Option<RawDosing>,
    }

    let raw: RawResponse =
        serde_json::from_str(json_str).map_err(|e| AdvisoryError::JsonParsing(e.to_string()))?;

    let (nested_key, nested_reason) = match raw.selected_medication {
        Some(sel) => (sel.drug_key, sel.reasoning),
        None => (None, None),
    };

    let total_mg = raw
        .total_mg
        .or_else(|| raw.dosing.and_then(|d| d.total_mg))
        .ok_or_else(|| AdvisoryError::MalformedResponse("total_mg missing".into()))?;

    if !total_mg.is_finite() || total_mg <= 0.0 {
        return Err(AdvisoryError::MalformedResponse(format!(
            "total_mg must be a positive number (got {total_mg})"
        )));
    }

    Ok(AdvisoryProposal {
        drug_key: non_blank(raw.drug_key.or(nested_key)),
        rationale: non_blank(raw.rationale.or(nested_reason)),
        total_mg,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// The JSON object inside `response`, with any code fence stripped.
fn extract_json(response: &str) -> Result<&str, AdvisoryError> {
    let trimmed = response.trim();
    let body = match trimmed.find("```") {
        Some(fence) => {
            let after = &trimmed[fence + 3..];
            let after = after.strip_prefix("json").unwrap_or(after);
            let end = after
                .find("```")
                .ok_or_else(|| AdvisoryError::MalformedResponse("Unclosed JSON block".into()))?;
            after[..end].trim()
        }
        None => trimmed,
    };

    if body.starts_with('{') && body.ends_with('}') {
        Ok(body)
    } else {
        Err(AdvisoryError::MalformedResponse("No JSON object found".into()))
    }
}
