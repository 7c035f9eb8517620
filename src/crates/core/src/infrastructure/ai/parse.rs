//! Extraction of structured JSON from noisy model output.

use crate::util::errors::{TripMeshError, TripMeshResult};

/// Cuts the outermost JSON object out of possibly noisy model text
/// (markdown fences, commentary before/after).
pub fn extract_json_object(model_text: &str) -> TripMeshResult<&str> {
    let start = model_text.find('{').ok_or_else(|| {
        TripMeshError::ParseFailure("model output did not contain a JSON object".to_string())
    })?;
    let end = model_text.rfind('}').ok_or_else(|| {
        TripMeshError::ParseFailure("model output did not contain a JSON object end".to_string())
    })?;
    if end < start {
        return Err(TripMeshError::ParseFailure(
            "model output contained mismatched braces".to_string(),
        ));
    }
    Ok(&model_text[start..=end])
}

/// Extracts and deserializes in one step.
pub fn parse_json_payload<T: serde::de::DeserializeOwned>(model_text: &str) -> TripMeshResult<T> {
    let json_str = extract_json_object(model_text)?;
    serde_json::from_str(json_str)
        .map_err(|e| TripMeshError::ParseFailure(format!("failed to parse model JSON: {}", e)))
}
