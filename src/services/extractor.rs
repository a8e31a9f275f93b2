use serde_json::Value;
use thiserror::Error;

const FENCE_OPEN: &str = "```json";
const FENCE_CLOSE: &str = "```";

/// Why a model reply could not be turned into JSON.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The reply looked like JSON (braces or a fenced block) but failed to parse.
    #[error("Failed to decode JSON from response: {source}\nResponse text was:\n{raw}")]
    Decode {
        #[source]
        source: serde_json::Error,
        raw: String,
    },
    /// The reply did not resemble JSON at all.
    #[error("API response did not appear to be valid JSON. Response: {raw}")]
    NotJson { raw: String },
}

impl ExtractionError {
    pub fn raw(&self) -> &str {
        match self {
            ExtractionError::Decode { raw, .. } => raw,
            ExtractionError::NotJson { raw } => raw,
        }
    }
}

/// Pull a JSON value out of a free-form model reply.
///
/// Tries, in order: the whole text as an object (`{...}`), the first
/// ```` ```json ```` fenced block, then the whole text as any JSON value.
/// Once a fence is found the fenced content is the only candidate.
pub fn extract(raw: &str) -> Result<Value, ExtractionError> {
    let text = raw.trim();

    if text.starts_with('{') && text.ends_with('}') {
        return parse(text, text);
    }

    if let Some(open) = text.find(FENCE_OPEN) {
        let body = &text[open + FENCE_OPEN.len()..];
        // Unterminated fence: take everything after the opening marker
        let body = match body.find(FENCE_CLOSE) {
            Some(close) => &body[..close],
            None => body,
        };
        return parse(body.trim(), text);
    }

    serde_json::from_str(text).map_err(|_| ExtractionError::NotJson {
        raw: text.to_string(),
    })
}

fn parse(candidate: &str, text: &str) -> Result<Value, ExtractionError> {
    serde_json::from_str(candidate).map_err(|source| ExtractionError::Decode {
        source,
        raw: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    #[test]
    fn test_empty_object_is_unrecognized_food() {
        let value = extract("{}").unwrap();
        assert_eq!(value, json!({}));
    }

    #[test]
    fn test_pure_json_reply() {
        let value = extract(
            r#"{"calories": "740", "protein": "20g", "carbohydrates": "30g", "fat": "15g"}"#,
        )
        .unwrap();

        let map = value.as_object().unwrap();
        assert_eq!(map.len(), 4);
        assert_eq!(map["calories"], "740");
        assert_eq!(map["protein"], "20g");
        assert_eq!(map["carbohydrates"], "30g");
        assert_eq!(map["fat"], "15g");
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed() {
        let value = extract("\n\n  {\"fat\": \"3g\"}  \n").unwrap();
        assert_eq!(value, json!({"fat": "3g"}));
    }

    #[test]
    fn test_fenced_block_inside_prose() {
        let reply = "Here you go:\n```json\n{\"calories\": \"100\"}\n```\nEnjoy!";
        assert_eq!(extract(reply).unwrap(), json!({"calories": "100"}));
    }

    #[test]
    fn test_first_fenced_block_wins() {
        let reply = "```json\n{\"calories\": \"1\"}\n```\nor maybe\n```json\n{\"calories\": \"2\"}\n```";
        assert_eq!(extract(reply).unwrap(), json!({"calories": "1"}));
    }

    #[test]
    fn test_direct_form_beats_fence_in_string_value() {
        let reply = r#"{"calories": "see ```json notes```"}"#;
        assert_eq!(
            extract(reply).unwrap(),
            json!({"calories": "see ```json notes```"})
        );
    }

    #[test]
    fn test_unterminated_fence_takes_rest_of_text() {
        let reply = "Sure!\n```json\n{\"protein\": \"8g\"}";
        assert_eq!(extract(reply).unwrap(), json!({"protein": "8g"}));
    }

    #[test]
    fn test_prose_is_not_json() {
        let err = extract("I cannot identify this food.").unwrap_err();
        assert!(matches!(err, ExtractionError::NotJson { .. }));
        assert_eq!(
            err.to_string(),
            "API response did not appear to be valid JSON. Response: I cannot identify this food."
        );
    }

    #[test]
    fn test_empty_fence_is_decode_error() {
        let err = extract("```json\n\n```").unwrap_err();
        assert!(matches!(err, ExtractionError::Decode { .. }));

        let message = err.to_string();
        assert!(message.starts_with("Failed to decode JSON from response: "));
        assert!(message.ends_with("Response text was:\n```json\n\n```"));
    }

    #[test]
    fn test_decode_error_keeps_parser_error_as_source() {
        use std::error::Error as _;

        let err = extract("{\"calories\": }").unwrap_err();
        assert!(err.source().is_some());

        let err = extract("nothing to see").unwrap_err();
        assert!(err.source().is_none());
    }

    #[test]
    fn test_broken_fenced_json_does_not_fall_through() {
        let err = extract("```json\n{\"calories\": }\n```").unwrap_err();
        assert!(matches!(err, ExtractionError::Decode { .. }));
    }

    #[test]
    fn test_broken_braced_json_is_decode_error() {
        let err = extract("{calories: 100}").unwrap_err();
        assert!(matches!(err, ExtractionError::Decode { .. }));
        assert_eq!(err.raw(), "{calories: 100}");
    }

    #[test]
    fn test_non_object_json_is_returned_as_is() {
        assert_eq!(extract("[1, 2, 3]").unwrap(), json!([1, 2, 3]));
        assert_eq!(extract("\"just text\"").unwrap(), json!("just text"));
        assert_eq!(
            extract("```json\n[\"a\"]\n```").unwrap(),
            json!(["a"])
        );
    }

    #[test]
    fn test_string_maps_round_trip() {
        let samples: Vec<Vec<(&str, &str)>> = vec![
            vec![],
            vec![("calories", "740")],
            vec![("protein", "20g"), ("fat", "15g")],
            vec![("quote", "he said \"hi\""), ("newline", "a\nb")],
            vec![("unicode", "şekerli çay ☕"), ("braces", "{}}{")],
            vec![("fence", "```json"), ("backslash", "C:\\food")],
        ];

        for pairs in samples {
            let map: Map<String, Value> = pairs
                .iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
                .collect();
            let text = serde_json::to_string(&map).unwrap();

            assert_eq!(extract(&text).unwrap(), Value::Object(map));
        }
    }

    #[test]
    fn test_odd_inputs_never_panic() {
        let inputs = [
            "",
            "   ",
            "```",
            "``````",
            "```json",
            "```json```",
            "```json ```json ```",
            "{",
            "}",
            "}{",
            "\u{feff}",
            "\u{fffd}\u{fffd}{",
            "ç```jsonğ```ü",
        ];

        for input in inputs {
            assert!(extract(input).is_err(), "expected failure for {:?}", input);
        }
    }
}
