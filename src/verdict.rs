//! Qualification verdicts produced from language model output

use serde_json::{json, Value};

/// Reason attached to proposals that have no indexed chunks
pub const NO_CONTENT_REASON: &str = "No content indexed for this proposal.";

/// Verdict for a proposal with nothing to retrieve
pub fn no_content_verdict() -> Value {
    json!({
        "qualifies": "no",
        "reason": NO_CONTENT_REASON,
    })
}

/// Parse a raw model response.
///
/// Valid JSON of any shape is returned as-is. Anything else becomes
/// `{"qualifies": null, "reason": <trimmed raw text>}`.
pub fn parse_verdict(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::debug!("Model output is not valid JSON ({}), keeping raw text", e);
            json!({
                "qualifies": null,
                "reason": raw.trim(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_json_falls_back() {
        let verdict = parse_verdict("not valid json");
        assert_eq!(verdict, json!({"qualifies": null, "reason": "not valid json"}));
    }

    #[test]
    fn test_fallback_trims_whitespace() {
        let verdict = parse_verdict("\n  The company qualifies.  \n");
        assert_eq!(verdict["reason"], "The company qualifies.");
        assert!(verdict["qualifies"].is_null());
    }

    #[test]
    fn test_valid_verdict_passes_through() {
        let raw = r#"{"qualifies": "yes", "reason": "strong alignment"}"#;
        let verdict = parse_verdict(raw);
        assert_eq!(verdict, json!({"qualifies": "yes", "reason": "strong alignment"}));
    }

    #[test]
    fn test_rubric_list_passes_through() {
        let raw = r#"[{"section": "Budget", "score": 7, "reason": "fits"}]"#;
        let verdict = parse_verdict(raw);
        assert!(verdict.is_array());
        assert_eq!(verdict[0]["score"], 7);
    }

    #[test]
    fn test_no_content_verdict() {
        assert_eq!(
            no_content_verdict(),
            json!({"qualifies": "no", "reason": "No content indexed for this proposal."})
        );
    }
}
