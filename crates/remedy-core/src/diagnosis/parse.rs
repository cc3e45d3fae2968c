//! Parsing of the generator's raw answer into a [`Diagnosis`].

use serde::Deserialize;

use crate::{
    error::DiagnosisError,
    models::{Confidence, Diagnosis},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDiagnosis {
    #[serde(default, alias = "root_cause")]
    root_cause: Option<String>,
    #[serde(default)]
    steps: Option<Vec<String>>,
    #[serde(default)]
    confidence: Option<String>,
}

fn invalid(reason: impl Into<String>) -> DiagnosisError {
    DiagnosisError::LlmResponseInvalid {
        reason: reason.into(),
    }
}

/// Outermost `{ ... }` span, which drops code fences and surrounding prose.
fn json_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start < end).then(|| &raw[start..=end])
}

/// Parse a generator response.
///
/// # Errors
///
/// `DiagnosisError::LlmResponseInvalid` with the first problem found: no
/// JSON object, malformed JSON, a missing or blank `rootCause`, no
/// non-blank `steps`, or a missing or unknown `confidence`.
pub fn parse_diagnosis(raw: &str) -> Result<Diagnosis, DiagnosisError> {
    let json = json_span(raw).ok_or_else(|| invalid("response contains no JSON object"))?;

    let parsed: RawDiagnosis = serde_json::from_str(json)
        .map_err(|e| invalid(format!("response is not valid JSON: {e}")))?;

    let root_cause = parsed
        .root_cause
        .map(|s| s.trim().to_string())
        .ok_or_else(|| invalid("missing field 'rootCause'"))?;
    if root_cause.is_empty() {
        return Err(invalid("field 'rootCause' is blank"));
    }

    let steps: Vec<String> = parsed
        .steps
        .ok_or_else(|| invalid("missing field 'steps'"))?
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if steps.is_empty() {
        return Err(invalid("field 'steps' has no non-blank entries"));
    }

    let confidence = parsed
        .confidence
        .ok_or_else(|| invalid("missing field 'confidence'"))?
        .parse::<Confidence>()
        .map_err(invalid)?;

    Ok(Diagnosis {
        root_cause,
        steps,
        confidence,
    })
}
