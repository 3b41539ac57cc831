//! Fail-closed decoding of backend output.
//!
//! The backend is asked for a bare JSON array of records. Models still wrap
//! answers in Markdown fences or prose, so the decoder first isolates the
//! array, then decodes each element strictly against [`AnalysisRecord`].
//! Anything that is not an array is an error; elements that do not match the
//! record shape are dropped.

use analysis_core::{AnalysisError, AnalysisRecord, Result};
use serde_json::Value;
use tracing::warn;

/// Decodes backend text into records.
///
/// # Errors
/// Returns [`AnalysisError::EmptyResponse`] for blank text and
/// [`AnalysisError::Parse`] if the text holds no JSON array.
pub fn decode_records(text: &str) -> Result<Vec<AnalysisRecord>> {
    let body = strip_code_fence(text.trim());
    if body.is_empty() {
        return Err(AnalysisError::EmptyResponse("analyzer".to_string()));
    }

    let elements = match serde_json::from_str::<Value>(body) {
        Ok(Value::Array(elements)) => elements,
        Ok(other) => {
            return Err(AnalysisError::Parse(format!(
                "expected a JSON array of analyses, got {}",
                kind(&other)
            )));
        }
        // Prose around the array: fall back to the outermost brackets.
        Err(_) => match extract_array(body) {
            Some(slice) => match serde_json::from_str::<Value>(slice)? {
                Value::Array(elements) => elements,
                other => {
                    return Err(AnalysisError::Parse(format!(
                        "expected a JSON array of analyses, got {}",
                        kind(&other)
                    )));
                }
            },
            None => {
                return Err(AnalysisError::Parse(
                    "no JSON array found in analyzer output".to_string(),
                ));
            }
        },
    };

    let total = elements.len();
    let records: Vec<AnalysisRecord> = elements
        .into_iter()
        .enumerate()
        .filter_map(|(index, element)| match serde_json::from_value::<AnalysisRecord>(element) {
            Ok(record) if record.stock.is_blank() => {
                warn!(index, "Dropping analysis without a stock symbol");
                None
            }
            Ok(record) => Some(record),
            Err(e) => {
                warn!(index, error = %e, "Dropping malformed analysis");
                None
            }
        })
        .collect();

    if records.len() < total {
        warn!(
            decoded = records.len(),
            total, "Analyzer output was partially malformed"
        );
    }

    Ok(records)
}

/// Removes a surrounding Markdown code fence, with or without a language tag.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.find('\n').map_or("", |i| &rest[i + 1..]);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Returns the slice from the first `[` to the last `]`.
fn extract_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (start < end).then(|| &text[start..=end])
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
