// Decoding of raw completion text into typed agent output
//
// Shared by every agent role. Models often wrap JSON in markdown code
// fences despite being told not to, so fences are stripped before parsing.
// Anything that still fails to parse into the expected shape is a hard
// failure for that stage.

use serde::de::DeserializeOwned;

use super::errors::{AgentError, AgentResult};

const FENCE: &str = "```";

/// Remove a surrounding code fence (with optional language tag) and whitespace
///
/// # Example
/// ```
/// use taskpilot_api::agents::decode::strip_code_fences;
///
/// assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
/// assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
/// ```
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix(FENCE) {
        let tag_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        text = &rest[tag_len..];
    }

    if let Some(rest) = text.trim_end().strip_suffix(FENCE) {
        text = rest;
    }

    text.trim()
}

/// Decode completion text into `T`
///
/// Syntax errors and shape mismatches both become
/// `AgentError::MalformedResponse`, carrying the untouched raw text.
pub fn decode_response<T: DeserializeOwned>(raw: &str) -> AgentResult<T> {
    let body = strip_code_fences(raw);

    serde_json::from_str(body).map_err(|e| {
        tracing::warn!(error = %e, "Failed to decode agent response");
        tracing::debug!(raw = %raw, "Undecodable agent response");
        AgentError::malformed(e.to_string(), raw)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::{json, Value};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Shape {
        name: String,
        count: u32,
    }

    #[test]
    fn fenced_and_bare_text_decode_identically() {
        let bare = r#"{"name": "x", "count": 2}"#;
        let fenced = format!("```json\n{}\n```", bare);
        let untagged = format!("```\n{}\n```", bare);

        let expected: Shape = decode_response(bare).unwrap();
        assert_eq!(decode_response::<Shape>(&fenced).unwrap(), expected);
        assert_eq!(decode_response::<Shape>(&untagged).unwrap(), expected);
    }

    #[test]
    fn decoding_twice_gives_equal_results() {
        let raw = "```json\n{\"steps\": [1, 2, {\"k\": null}]}\n```";

        let first: Value = decode_response(raw).unwrap();
        let second: Value = decode_response(raw).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, json!({"steps": [1, 2, {"k": null}]}));
    }

    #[test]
    fn fence_on_single_line() {
        assert_eq!(strip_code_fences("```{\"a\":1}```"), "{\"a\":1}");
    }

    #[test]
    fn whitespace_around_fences_is_ignored() {
        let raw = "\n\n  ```json\n[1, 2]\n```  \n";
        assert_eq!(strip_code_fences(raw), "[1, 2]");
    }

    #[test]
    fn invalid_json_keeps_raw_text() {
        let raw = "Sure! Here is your plan: step one...";

        match decode_response::<Value>(raw) {
            Err(AgentError::MalformedResponse { raw: kept, .. }) => assert_eq!(kept, raw),
            other => panic!("expected malformed response, got {:?}", other),
        }
    }

    #[test]
    fn shape_mismatch_is_malformed() {
        let raw = r#"{"name": "x"}"#;
        assert!(matches!(
            decode_response::<Shape>(raw),
            Err(AgentError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn empty_fence_is_malformed() {
        assert!(decode_response::<Value>("```json\n```").is_err());
    }
}
