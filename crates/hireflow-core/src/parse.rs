//! Parse-then-validate for capability responses.
//!
//! Capabilities answer in free text that should embed one JSON object. Each
//! parser locates the first balanced `{...}` substring, decodes it, and checks
//! the fields the pipeline depends on. Failures come back as [`ParseError`];
//! callers decide how to degrade.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::domain::{
    ConsensusResult, EvaluationResult, EvaluatorRole, Outcome, Recommendation, SCORE_MAX,
    SCORE_MIN,
};
use crate::error::ParseError;

/// Return the first brace-balanced substring of `text` that starts with `{`.
///
/// Braces inside JSON string literals do not count toward the balance.
pub fn extract_json_object(text: &str) -> Result<&str, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    for (start, _) in text.match_indices('{') {
        if let Some(end) = balanced_end(&text[start..]) {
            return Ok(&text[start..start + end]);
        }
    }
    Err(ParseError::NoJsonObject)
}

/// Byte length of the balanced object at the start of `s`, if it closes.
fn balanced_end(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + c.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

fn object_from(text: &str) -> Result<Map<String, Value>, ParseError> {
    let raw = extract_json_object(text)?;
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ParseError::NoJsonObject),
        Err(e) => Err(ParseError::InvalidJson(e.to_string())),
    }
}

/// Read a number, accepting numeric strings such as `"7.5"`.
fn number(map: &Map<String, Value>, field: &'static str) -> Result<Option<f64>, ParseError> {
    let value = match map.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(v) => v,
    };
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(n) if n.is_finite() => Ok(Some(n)),
        _ => Err(ParseError::InvalidField {
            field,
            detail: format!("expected a number, got {value}"),
        }),
    }
}

fn required_number(map: &Map<String, Value>, field: &'static str) -> Result<f64, ParseError> {
    number(map, field)?.ok_or(ParseError::MissingField(field))
}

fn in_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<f64, ParseError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ParseError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

fn required_str<'a>(
    map: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, ParseError> {
    match map.get(field) {
        None | Some(Value::Null) => Err(ParseError::MissingField(field)),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(other) => Err(ParseError::InvalidField {
            field,
            detail: format!("expected a string, got {other}"),
        }),
    }
}

fn optional_text(map: &Map<String, Value>, field: &str) -> Option<String> {
    map.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Flatten a JSON value into rationale text.
fn aspect_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

/// Parse an evaluator response for `role`.
///
/// Requires a numeric `score` in `[1, 10]` and a recognized `recommendation`.
/// Every other top-level field becomes a rationale aspect.
pub fn parse_evaluation(role: EvaluatorRole, text: &str) -> Result<EvaluationResult, ParseError> {
    let map = object_from(text)?;

    let score = required_number(&map, "score")?;
    let label = required_str(&map, "recommendation")?;
    let recommendation =
        Recommendation::from_label(label).ok_or_else(|| ParseError::UnknownLabel {
            kind: "recommendation",
            label: label.to_string(),
        })?;

    let mut result = EvaluationResult::new(role, score, recommendation)?;
    result.rationale = map
        .iter()
        .filter(|(k, _)| !matches!(k.as_str(), "score" | "recommendation" | "agent"))
        .map(|(k, v)| (k.clone(), aspect_text(v)))
        .collect::<BTreeMap<_, _>>();
    Ok(result)
}

/// Parse a mediator response: `consensus_score` in `[1, 10]` plus `reasoning`.
pub fn parse_consensus(text: &str) -> Result<ConsensusResult, ParseError> {
    let map = object_from(text)?;
    let score = in_range(
        "consensus_score",
        required_number(&map, "consensus_score")?,
        SCORE_MIN,
        SCORE_MAX,
    )?;
    let rationale = required_str(&map, "reasoning")?.trim().to_string();
    Ok(ConsensusResult { score, rationale })
}

/// The judge's verdict before it is combined with the round's own numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct Judgment {
    pub outcome: Outcome,
    pub confidence: f64,
    pub rationale: String,
    /// Judge-computed weighted score, kept only when inside `[1, 10]`.
    pub weighted_score: Option<f64>,
    pub details: Option<Value>,
    pub clarification_question: Option<String>,
}

/// Parse a judge response: `final_decision`, `confidence_score`, `reasoning`, `details`.
pub fn parse_judgment(text: &str) -> Result<Judgment, ParseError> {
    let map = object_from(text)?;

    let label = required_str(&map, "final_decision")?;
    let outcome = Outcome::from_label(label).ok_or_else(|| ParseError::UnknownLabel {
        kind: "decision",
        label: label.to_string(),
    })?;

    let confidence = match number(&map, "confidence_score")? {
        Some(c) => c,
        None => required_number(&map, "confidence")?,
    };
    let confidence = in_range("confidence_score", confidence, 0.0, 1.0)?;

    let rationale = required_str(&map, "reasoning")?.trim().to_string();

    let weighted_score = number(&map, "weighted_score")
        .ok()
        .flatten()
        .filter(|s| (SCORE_MIN..=SCORE_MAX).contains(s));

    let details = map.get("details").filter(|v| !v.is_null()).cloned();

    let clarification_question = optional_text(&map, "clarification_question")
        .or_else(|| optional_text(&map, "follow_up_question"));

    Ok(Judgment {
        outcome,
        confidence,
        rationale,
        weighted_score,
        details,
        clarification_question,
    })
}

/// Parse a clarifier response: any non-blank text, trimmed.
pub fn parse_clarification(text: &str) -> Result<String, ParseError> {
    let question = text.trim();
    if question.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(question.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_object_surrounded_by_prose() {
        let text = "Here is my evaluation:\n{\"score\": 8, \"recommendation\": \"YES\"}\nThanks!";
        assert_eq!(
            extract_json_object(text).unwrap(),
            "{\"score\": 8, \"recommendation\": \"YES\"}"
        );
    }

    #[test]
    fn test_extracts_first_balanced_object_only() {
        let text = r#"{"a": {"b": 1}} and later {"c": 2}"#;
        assert_eq!(extract_json_object(text).unwrap(), r#"{"a": {"b": 1}}"#);
    }

    #[test]
    fn test_braces_inside_strings_do_not_count() {
        let text = r#"result: {"note": "uses } and { freely", "quote": "say \"}\""} tail"#;
        assert_eq!(
            extract_json_object(text).unwrap(),
            r#"{"note": "uses } and { freely", "quote": "say \"}\""}"#
        );
    }

    #[test]
    fn test_unclosed_leading_brace_skips_to_next_candidate() {
        let text = r#"{ unterminated thought {"score": 6}"#;
        assert_eq!(extract_json_object(text).unwrap(), r#"{"score": 6}"#);
    }

    #[test]
    fn test_no_object_and_empty_text() {
        assert_eq!(
            extract_json_object("score: 7, recommendation: yes"),
            Err(ParseError::NoJsonObject)
        );
        assert_eq!(extract_json_object("   "), Err(ParseError::Empty));
    }

    #[test]
    fn test_parse_evaluation_collects_rationale_aspects() {
        let text = r#"Final answer:
        {
            "score": 7.5,
            "recommendation": "strong yes",
            "justification": "Solid systems background",
            "strengths": ["Problem-solving", "Communication"],
            "red_flags": []
        }"#;
        let result = parse_evaluation(EvaluatorRole::Rh, text).unwrap();
        assert_eq!(result.evaluator, EvaluatorRole::Rh);
        assert_eq!(result.score, 7.5);
        assert_eq!(result.recommendation, Recommendation::StrongYes);
        assert!(!result.is_placeholder());
        assert_eq!(
            result.rationale.get("strengths").unwrap(),
            "Problem-solving; Communication"
        );
        assert_eq!(result.rationale.get("red_flags").unwrap(), "");
        assert!(!result.rationale.contains_key("score"));
    }

    #[test]
    fn test_parse_evaluation_accepts_numeric_string_score() {
        let result =
            parse_evaluation(EvaluatorRole::Sales, r#"{"score": "6", "recommendation": "NO"}"#)
                .unwrap();
        assert_eq!(result.score, 6.0);
    }

    #[test]
    fn test_parse_evaluation_validation_failures() {
        let cases = [
            (r#"{"recommendation": "YES"}"#, "missing score"),
            (r#"{"score": 7}"#, "missing recommendation"),
            (r#"{"score": "high", "recommendation": "YES"}"#, "non-numeric score"),
            (r#"{"score": 11, "recommendation": "YES"}"#, "score above range"),
            (r#"{"score": 0, "recommendation": "YES"}"#, "score below range"),
            (r#"{"score": 7, "recommendation": "HIRE"}"#, "unknown label"),
            (r#"{"score": 7, "recommendation": 1}"#, "label not a string"),
            (r#"{"score": 7, "recommendation": "YES",}"#, "invalid json"),
        ];
        for (text, why) in cases {
            assert!(
                parse_evaluation(EvaluatorRole::Manager, text).is_err(),
                "expected failure for {why}"
            );
        }
    }

    #[test]
    fn test_parse_consensus_enforces_range() {
        let ok = parse_consensus(r#"{"consensus_score": 7.0, "reasoning": " balanced "}"#).unwrap();
        assert_eq!(ok.score, 7.0);
        assert_eq!(ok.rationale, "balanced");

        let err = parse_consensus(r#"{"consensus_score": 12, "reasoning": "x"}"#).unwrap_err();
        assert!(matches!(err, ParseError::OutOfRange { .. }));

        let err = parse_consensus(r#"{"consensus_score": 7}"#).unwrap_err();
        assert_eq!(err, ParseError::MissingField("reasoning"));
    }

    #[test]
    fn test_parse_judgment_full() {
        let text = r#"{
            "final_decision": "PASS",
            "confidence_score": 0.8,
            "reasoning": "Weak culture fit",
            "weighted_score": 5.2,
            "details": {"critical_factors": ["communication"]}
        }"#;
        let j = parse_judgment(text).unwrap();
        assert_eq!(j.outcome, Outcome::Reject);
        assert_eq!(j.confidence, 0.8);
        assert_eq!(j.weighted_score, Some(5.2));
        assert!(j.details.is_some());
        assert_eq!(j.clarification_question, None);
    }

    #[test]
    fn test_parse_judgment_confidence_alias_and_question() {
        let text = r#"{"final_decision": "maybe", "confidence": 0.4, "reasoning": "split",
                       "clarification_question": "  How do you handle on-call?  "}"#;
        let j = parse_judgment(text).unwrap();
        assert_eq!(j.outcome, Outcome::Maybe);
        assert_eq!(j.confidence, 0.4);
        assert_eq!(
            j.clarification_question.as_deref(),
            Some("How do you handle on-call?")
        );
    }

    #[test]
    fn test_parse_judgment_rejects_bad_confidence_and_outcome() {
        let err =
            parse_judgment(r#"{"final_decision": "HIRE", "confidence_score": 1.5, "reasoning": "x"}"#)
                .unwrap_err();
        assert!(matches!(err, ParseError::OutOfRange { .. }));

        let err = parse_judgment(
            r#"{"final_decision": "STRONG_HIRE", "confidence_score": 0.9, "reasoning": "x"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::UnknownLabel { .. }));
    }

    #[test]
    fn test_parse_judgment_drops_out_of_range_weighted_score() {
        let j = parse_judgment(
            r#"{"final_decision": "HIRE", "confidence_score": 0.9, "reasoning": "x", "weighted_score": 78}"#,
        )
        .unwrap();
        assert_eq!(j.weighted_score, None);
    }

    #[test]
    fn test_parse_clarification() {
        assert_eq!(
            parse_clarification("\n What was your biggest outage? \n").unwrap(),
            "What was your biggest outage?"
        );
        assert_eq!(parse_clarification(" \n"), Err(ParseError::Empty));
    }
}
