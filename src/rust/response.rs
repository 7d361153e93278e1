//! Recovery of JSON payloads embedded in free-form generative output.
//!
//! Generative models rarely return bare JSON. A typical completion wraps the
//! payload in a fenced block and surrounds it with prose:
//!
//! ````text
//! Sure! Here is the classification:
//! ```json
//! {"predicted_class": "cat", "probability": 0.92}
//! ```
//! Let me know if you need anything else.
//! ````
//!
//! Extraction rules, in order:
//! 1. If a ```` ```json ```` fence occurs anywhere in the input, the payload is the
//!    content between it and the next closing ```` ``` ```` (or the end of the
//!    input when the block is never closed).
//! 2. Otherwise the whole trimmed input is the payload.
//!
//! Newlines and carriage returns are then removed and the payload is decoded.

use log::debug;
use serde::de::DeserializeOwned;

use crate::classifier::ClassifierError;
use crate::generator::TextGenerator;

/// System instruction used by [`generate_object`].
pub const OBJECT_SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant that generates text based on the given prompt.";
const OBJECT_SEED: i64 = 1;

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// A decoded response shape that can reject values serde accepts but the
/// caller cannot use.
pub trait ResponseSchema: DeserializeOwned {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Returns the JSON payload of a raw completion, without decoding it.
pub fn extract_json_payload(raw: &str) -> String {
    let payload = match find_json_fence(raw) {
        Some(content_start) => {
            let body = &raw[content_start..];
            match body.find(FENCE) {
                Some(end) => &body[..end],
                None => body,
            }
        }
        None => raw,
    };

    payload
        .trim()
        .chars()
        .filter(|c| *c != '\n' && *c != '\r')
        .collect()
}

/// Byte offset just past the first `json`-tagged opening fence.
fn find_json_fence(raw: &str) -> Option<usize> {
    // ASCII lowercasing keeps byte offsets aligned with `raw`
    let lowered = raw.to_ascii_lowercase();
    lowered.find(JSON_FENCE).map(|pos| pos + JSON_FENCE.len())
}

/// Extracts and decodes the JSON payload of `raw` into `T`.
///
/// # Errors
/// * `ClassifierError::ValidationError` if `raw` is empty or whitespace
/// * `ClassifierError::ParseError` if the payload does not decode into `T`
pub fn parse_response<T: DeserializeOwned>(raw: &str) -> Result<T, ClassifierError> {
    if raw.trim().is_empty() {
        return Err(ClassifierError::ValidationError("Response text cannot be empty".into()));
    }

    let payload = extract_json_payload(raw);
    debug!("Decoding {} byte JSON payload", payload.len());

    serde_json::from_str(&payload).map_err(|e| {
        ClassifierError::ParseError(format!("Response is not valid JSON for the expected shape: {}", e))
    })
}

/// Like [`parse_response`], then applies the schema's own validation.
pub fn parse_schema<T: ResponseSchema>(raw: &str) -> Result<T, ClassifierError> {
    let value: T = parse_response(raw)?;
    value.validate().map_err(ClassifierError::ParseError)?;
    Ok(value)
}

/// Asks `generator` for a JSON object matching `schema` and decodes the answer
/// into `T`. The schema is appended to `prompt` verbatim.
pub fn generate_object<T: DeserializeOwned>(
    generator: &dyn TextGenerator,
    prompt: &str,
    schema: &str,
    temperature: f32,
) -> Result<T, ClassifierError> {
    if prompt.trim().is_empty() {
        return Err(ClassifierError::ValidationError("Prompt cannot be empty".into()));
    }
    let user = format!(
        "{}\nReturn the response in JSON as per the schema.\nSchema: {}",
        prompt, schema
    );
    let raw = generator.generate(OBJECT_SYSTEM_PROMPT, &user, temperature, OBJECT_SEED)?;
    parse_response(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::HashMap;

    #[derive(Debug, Deserialize)]
    struct Person {
        name: String,
        age: u32,
        tags: Vec<String>,
    }

    #[derive(Debug, Deserialize)]
    struct Score {
        value: f64,
    }

    impl ResponseSchema for Score {
        fn validate(&self) -> Result<(), String> {
            if self.value < 0.0 {
                return Err("value must be positive".into());
            }
            Ok(())
        }
    }

    #[test]
    fn test_empty_input() {
        let result = parse_response::<serde_json::Value>("");
        assert!(matches!(result, Err(ClassifierError::ValidationError(_))));

        let result = parse_response::<serde_json::Value>("  \n ");
        assert!(matches!(result, Err(ClassifierError::ValidationError(_))));
    }

    #[test]
    fn test_invalid_json() {
        let result = parse_response::<serde_json::Value>("not json");
        assert!(matches!(result, Err(ClassifierError::ParseError(_))));
    }

    #[test]
    fn test_plain_object() {
        let result: HashMap<String, String> = parse_response(r#"{"key":"value"}"#).unwrap();
        assert_eq!(result.get("key").map(String::as_str), Some("value"));
    }

    #[test]
    fn test_fenced_object() {
        let raw = "```json\n{\"key\": \"value\"}\n```";
        let result: HashMap<String, String> = parse_response(raw).unwrap();
        assert_eq!(result["key"], "value");
    }

    #[test]
    fn test_prose_around_fence() {
        let raw = "LLM Response:  Here is a JSON object based on the provided schema:```json{\n\
                   \t\"name\": \"Alice Johnson\",\n\
                   \t\"age\": 30,\n\
                   \t\"tags\": [\"developer\", \"open-source\"]\n\
                   }```\nHope this helps!";
        let person: Person = parse_response(raw).unwrap();
        assert_eq!(person.name, "Alice Johnson");
        assert_eq!(person.age, 30);
        assert_eq!(person.tags, vec!["developer", "open-source"]);
    }

    #[test]
    fn test_fence_tag_case_insensitive() {
        let raw = "Result:\n```JSON\n{\"value\": 1.5}\n```";
        let score: Score = parse_response(raw).unwrap();
        assert_eq!(score.value, 1.5);
    }

    #[test]
    fn test_unclosed_fence() {
        let raw = "```json\n{\"value\": 2.0}";
        assert_eq!(extract_json_payload(raw), "{\"value\": 2.0}");
    }

    #[test]
    fn test_newlines_removed() {
        let raw = "{\r\n\"value\":\n 3.0\r\n}";
        assert_eq!(extract_json_payload(raw), "{\"value\": 3.0}");
    }

    #[test]
    fn test_untagged_fence_is_not_extracted() {
        let raw = "```\n{\"value\": 1.0}\n```";
        let result = parse_response::<Score>(raw);
        assert!(matches!(result, Err(ClassifierError::ParseError(_))));
    }

    #[test]
    fn test_wrong_shape() {
        let result = parse_response::<Person>(r#"{"name": "Bob"}"#);
        assert!(matches!(result, Err(ClassifierError::ParseError(_))));
    }

    #[test]
    fn test_schema_validation() {
        assert!(parse_schema::<Score>(r#"{"value": 0.5}"#).is_ok());
        let result = parse_schema::<Score>(r#"{"value": -0.5}"#);
        assert!(matches!(result, Err(ClassifierError::ParseError(_))));
    }

    struct Canned(&'static str);

    impl TextGenerator for Canned {
        fn generate(&self, system: &str, user: &str, _temperature: f32, seed: i64) -> Result<String, crate::GeneratorError> {
            assert_eq!(system, OBJECT_SYSTEM_PROMPT);
            assert!(user.ends_with("Schema: {\"name\": \"string\", \"age\": \"number\", \"tags\": [\"string\"]}"));
            assert_eq!(seed, 1);
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_generate_object() {
        let generator = Canned("```json\n{\"name\": \"Ada\", \"age\": 36, \"tags\": [\"math\"]}\n```");
        let schema = r#"{"name": "string", "age": "number", "tags": ["string"]}"#;
        let person: Person = generate_object(&generator, "Describe a mathematician", schema, 0.5).unwrap();
        assert_eq!(person.name, "Ada");
        assert_eq!(person.age, 36);

        let result = generate_object::<Person>(&Canned("no json here"), "Describe someone", schema, 0.5);
        assert!(matches!(result, Err(ClassifierError::ParseError(_))));
        let result = generate_object::<Person>(&generator, " ", schema, 0.5);
        assert!(matches!(result, Err(ClassifierError::ValidationError(_))));
    }
}
