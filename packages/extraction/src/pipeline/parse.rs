//! Parsing and vetting of the model's guide response.

use crate::error::{ExtractionError, Result};
use crate::types::Guide;

/// Summary phrases that mark content the model judged non-instructional.
const NON_INSTRUCTIONAL_MARKERS: &[&str] = &[
    "lyrics",
    "music video",
    "narration only",
    "no actionable steps",
    "no instructional steps",
    "not instructional",
];

/// Locate the outermost JSON object in a model response and parse it.
///
/// Models occasionally wrap the payload in prose or a code fence even
/// when told not to, so this takes everything between the first `{` and
/// the last `}` instead of requiring a bare object.
pub fn parse_guide_response(response: &str) -> Result<Guide> {
    let payload = extract_json_object(response).ok_or_else(|| {
        ExtractionError::Malformed("response contains no JSON object".to_string())
    })?;

    let guide: Guide = serde_json::from_str(payload)
        .map_err(|e| ExtractionError::Malformed(format!("guide payload did not parse: {e}")))?;

    if guide.title.trim().is_empty() {
        return Err(ExtractionError::Malformed("guide has an empty title".to_string()));
    }

    Ok(guide)
}

fn extract_json_object(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (end > start).then(|| &response[start..=end])
}

/// Post-hoc check on the parsed guide: the model flags non-instructional
/// content in the summary rather than through a dedicated field, so the
/// vetting is substring matching on known phrasings. An empty step list
/// counts as non-instructional too.
pub fn is_non_instructional(guide: &Guide) -> bool {
    if guide.steps.is_empty() {
        return true;
    }
    guide
        .summary
        .as_deref()
        .map(|summary| {
            let summary = summary.to_lowercase();
            NON_INSTRUCTIONAL_MARKERS
                .iter()
                .any(|marker| summary.contains(marker))
        })
        .unwrap_or(false)
}
