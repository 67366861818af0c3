//! Parse LLM output into atomic concepts

use quarry_domain::AtomicConcept;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::ExtractorError;

/// Parse an LLM response into a concept.
///
/// The first well-formed JSON object in the response is used, so prose
/// around it and markdown fences are tolerated. Fields that are missing or
/// of the wrong type come back empty; judging whether the result is good
/// enough is the validator's job.
pub fn parse_concept_response(response: &str) -> Result<AtomicConcept, ExtractorError> {
    let object = extract_json_object(response).ok_or_else(|| {
        ExtractorError::InvalidFormat("No JSON object found in response".to_string())
    })?;

    Ok(AtomicConcept {
        topic: text_field(&object, "topic"),
        explanation: text_field(&object, "explanation"),
        syntax: text_field(&object, "syntax"),
        code_example: code_lines(object.get("code_example")),
        example_explanation: text_field(&object, "example_explanation"),
        extraction_metadata: None,
    })
}

/// Find the first `{` that starts a complete JSON object
fn extract_json_object(response: &str) -> Option<Map<String, Value>> {
    response
        .char_indices()
        .filter(|(_, c)| *c == '{')
        .find_map(|(idx, _)| {
            let mut stream =
                serde_json::Deserializer::from_str(&response[idx..]).into_iter::<Value>();
            match stream.next() {
                Some(Ok(Value::Object(map))) => Some(map),
                _ => None,
            }
        })
}

fn text_field(object: &Map<String, Value>, key: &str) -> String {
    match object.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => {
            warn!(field = key, "Expected a string, got {}", other);
            String::new()
        }
    }
}

/// `code_example` is asked for as an array of lines but models sometimes
/// return a single string
fn code_lines(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(line) => Some(line.clone()),
                _ => None,
            })
            .flat_map(|line| line.lines().map(str::to_string).collect::<Vec<_>>())
            .collect(),
        Some(Value::String(code)) => code.lines().map(str::to_string).collect(),
        _ => Vec::new(),
    }
}
