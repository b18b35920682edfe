//! Parse model output into summaries and criterion results

use crate::LlmError;
use rankright_domain::{Criterion, CriterionResult, Ranking};
use serde_json::{Map, Value};
use tracing::debug;

/// Accept a summary reply; blank replies are malformed
pub fn parse_summary(response: &str) -> Result<String, LlmError> {
    let summary = response.trim();
    if summary.is_empty() {
        return Err(LlmError::MalformedResponse("empty summary".to_string()));
    }
    Ok(summary.to_string())
}

/// Parse a scoring reply for `criterion`
///
/// The ranking is always derived from the score; a ranking the model
/// reports is only compared for logging.
pub fn parse_score_response(
    criterion: Criterion,
    response: &str,
) -> Result<CriterionResult, LlmError> {
    let malformed = |msg: String| LlmError::MalformedResponse(format!("{}: {}", criterion.key(), msg));

    let json_str = strip_code_fence(response);
    let json: Value =
        serde_json::from_str(json_str).map_err(|e| malformed(format!("JSON parse error: {}", e)))?;
    let obj = json
        .as_object()
        .ok_or_else(|| malformed("expected a JSON object".to_string()))?;

    let score = parse_score(obj.get("score")).map_err(malformed)?;

    let justification = text_field(obj, &["justification", "explanation"])
        .filter(|j| !j.trim().is_empty())
        .ok_or_else(|| malformed("missing justification".to_string()))?;

    let recommendation =
        text_field(obj, &["recommendation", "recommendations"]).unwrap_or_default();

    let key_findings = match obj.get("key_findings") {
        Some(Value::Array(items)) => items.iter().filter_map(value_text).collect(),
        Some(other) => value_text(other).into_iter().collect(),
        None => Vec::new(),
    };

    let result = CriterionResult::new(criterion, score, recommendation, justification)
        .map_err(malformed)?
        .with_key_findings(key_findings);

    if let Some(reported) = obj.get("ranking").and_then(Value::as_str).and_then(Ranking::parse) {
        if reported != result.ranking {
            debug!(
                criterion = criterion.key(),
                score,
                reported = %reported,
                derived = %result.ranking,
                "Model ranking disagrees with score; using score"
            );
        }
    }

    Ok(result)
}

/// Strip a surrounding Markdown code fence, if any
fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string (e.g. "json") on the opening line
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Score as an integer in [0, 100]; numeric strings are accepted
fn parse_score(value: Option<&Value>) -> Result<u8, String> {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        Some(_) => None,
        None => return Err("missing score".to_string()),
    };

    let score = raw
        .filter(|s| s.is_finite())
        .ok_or_else(|| format!("non-numeric score: {}", value.map(Value::to_string).unwrap_or_default()))?;

    if !(0.0..=100.0).contains(&score) {
        return Err(format!("score {} out of range [0, 100]", score));
    }

    Ok((score + 0.5).floor() as u8)
}

/// First present field among `keys`, as text; arrays become one line per item
fn text_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match obj.get(*key)? {
        Value::Array(items) => {
            let lines: Vec<String> = items.iter().filter_map(value_text).collect();
            Some(lines.join("\n"))
        }
        other => value_text(other),
    })
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CRITERION: Criterion = Criterion::ClarityReadability;

    #[test]
    fn test_parse_valid_json() {
        let response = r#"{
            "score": 85,
            "ranking": "Green",
            "justification": "Plain language throughout",
            "key_findings": ["Short sentences", "Defined terms"],
            "recommendation": "Add a glossary"
        }"#;

        let result = parse_score_response(CRITERION, response).unwrap();
        assert_eq!(result.criterion, CRITERION);
        assert_eq!(result.score, 85);
        assert_eq!(result.ranking, Ranking::Green);
        assert_eq!(result.justification, "Plain language throughout");
        assert_eq!(result.recommendation, "Add a glossary");
        assert_eq!(result.key_findings, vec!["Short sentences", "Defined terms"]);
    }

    #[test]
    fn test_parse_json_with_markdown_wrapper() {
        let response = "```json\n{\"score\": 40, \"justification\": \"Dense\"}\n```";
        let result = parse_score_response(CRITERION, response).unwrap();
        assert_eq!(result.score, 40);
        assert_eq!(result.ranking, Ranking::Red);
        assert!(result.recommendation.is_empty());
    }

    #[test]
    fn test_ranking_comes_from_score() {
        let response = r#"{"score": 55, "ranking": "Green", "justification": "ok"}"#;
        let result = parse_score_response(CRITERION, response).unwrap();
        assert_eq!(result.ranking, Ranking::Amber);
    }

    #[test]
    fn test_numeric_string_and_fraction() {
        let response = r#"{"score": "79.5", "justification": "ok"}"#;
        assert_eq!(parse_score_response(CRITERION, response).unwrap().score, 80);

        let response = r#"{"score": 64.2, "justification": "ok"}"#;
        assert_eq!(parse_score_response(CRITERION, response).unwrap().score, 64);
    }

    #[test]
    fn test_list_valued_recommendation_and_explanation_alias() {
        let response = r#"{
            "score": 30,
            "explanation": "Hard to follow",
            "recommendations": ["Split long sentences", "Remove jargon"]
        }"#;

        let result = parse_score_response(CRITERION, response).unwrap();
        assert_eq!(result.justification, "Hard to follow");
        assert_eq!(result.recommendation, "Split long sentences\nRemove jargon");
    }

    #[test]
    fn test_missing_score_is_malformed() {
        let err = parse_score_response(CRITERION, r#"{"justification": "ok"}"#).unwrap_err();
        assert!(matches!(err, LlmError::MalformedResponse(_)));
    }

    #[test]
    fn test_out_of_range_score_is_malformed() {
        for response in [
            r#"{"score": 101, "justification": "ok"}"#,
            r#"{"score": -1, "justification": "ok"}"#,
            r#"{"score": "high", "justification": "ok"}"#,
            r#"{"score": true, "justification": "ok"}"#,
        ] {
            assert!(
                matches!(
                    parse_score_response(CRITERION, response),
                    Err(LlmError::MalformedResponse(_))
                ),
                "accepted {}",
                response
            );
        }
    }

    #[test]
    fn test_missing_justification_is_malformed() {
        let err = parse_score_response(CRITERION, r#"{"score": 70, "justification": "  "}"#)
            .unwrap_err();
        assert!(err.to_string().contains("justification"));
    }

    #[test]
    fn test_non_object_is_malformed() {
        assert!(parse_score_response(CRITERION, "[1, 2, 3]").is_err());
        assert!(parse_score_response(CRITERION, "This is not JSON").is_err());
    }

    #[test]
    fn test_strip_code_fence_variants() {
        assert_eq!(strip_code_fence(r#"{"a": 1}"#), r#"{"a": 1}"#);
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), r#"{"a": 1}"#);
        assert_eq!(strip_code_fence("```\n{\"a\": 1}\n```\n"), r#"{"a": 1}"#);
    }

    #[test]
    fn test_parse_summary() {
        assert_eq!(parse_summary("  A summary.\n").unwrap(), "A summary.");
        assert!(matches!(
            parse_summary("   "),
            Err(LlmError::MalformedResponse(_))
        ));
    }
}
