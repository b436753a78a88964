//! Normalization of the model's JSON reply into an `AnalysisResult`.
//!
//! The model is not trusted to follow the schema. Every field is coerced or replaced
//! with a fallback so the result always satisfies:
//! - `0 <= ats_score <= 100`
//! - `summary` is non-empty and at most 1000 characters
//! - each list holds between 1 and 6 entries

use serde_json::{Map, Value};

use crate::analysis::{truncate_chars, AnalysisResult};

pub const MAX_SUMMARY_CHARS: usize = 1000;
pub const MAX_LIST_ENTRIES: usize = 6;

const FALLBACK_SUMMARY: &str = "Professional resume analysis completed successfully";
const FALLBACK_STRENGTH: &str = "Professional experience identified";
const FALLBACK_WEAKNESS: &str = "Consider optimizing for ATS compatibility";
const FALLBACK_SUGGESTION: &str = "Add more industry-specific keywords";

pub fn normalize_analysis(raw: &Map<String, Value>) -> AnalysisResult {
    AnalysisResult {
        ats_score: coerce_score(raw.get("atsScore")),
        summary: coerce_summary(raw.get("summary")),
        strengths: coerce_list(raw.get("strengths"), FALLBACK_STRENGTH),
        weaknesses: coerce_list(raw.get("weaknesses"), FALLBACK_WEAKNESS),
        suggestions: coerce_list(raw.get("suggestions"), FALLBACK_SUGGESTION),
    }
}

/// Reads a score the way a lenient integer parse would: numbers are truncated,
/// strings contribute their leading integer ("85/100" → 85), anything else is 0.
fn coerce_score(value: Option<&Value>) -> u32 {
    let score = match value {
        Some(Value::Number(n)) => n.as_f64().map(f64::trunc),
        Some(Value::String(s)) => leading_integer(s),
        _ => None,
    };
    score.map_or(0, |s| s.clamp(0.0, 100.0) as u32)
}

fn leading_integer(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, text.strip_prefix('+').unwrap_or(text)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<f64>().ok().map(|n| sign * n)
}

fn coerce_summary(value: Option<&Value>) -> String {
    let summary = match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(v @ (Value::Number(_) | Value::Array(_) | Value::Object(_))) => v.to_string(),
        _ => FALLBACK_SUMMARY.to_string(),
    };
    truncate_chars(&summary, MAX_SUMMARY_CHARS).to_string()
}

fn coerce_list(value: Option<&Value>, fallback: &str) -> Vec<String> {
    let entries: Vec<String> = match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(entry_text)
            .take(MAX_LIST_ENTRIES)
            .collect(),
        _ => Vec::new(),
    };

    if entries.is_empty() {
        vec![fallback.to_string()]
    } else {
        entries
    }
}

fn entry_text(item: &Value) -> Option<String> {
    match item {
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.trim().to_string()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn normalize(value: Value) -> AnalysisResult {
        normalize_analysis(value.as_object().unwrap())
    }

    fn assert_invariants(result: &AnalysisResult) {
        assert!(result.ats_score <= 100);
        assert!(!result.summary.is_empty());
        assert!(result.summary.chars().count() <= MAX_SUMMARY_CHARS);
        for list in [&result.strengths, &result.weaknesses, &result.suggestions] {
            assert!((1..=MAX_LIST_ENTRIES).contains(&list.len()));
        }
    }

    #[test]
    fn test_well_formed_reply_passes_through() {
        let result = normalize(json!({
            "atsScore": 82,
            "summary": "Strong backend profile.",
            "strengths": ["Quantified impact"],
            "weaknesses": ["No skills section"],
            "suggestions": ["Add a skills section"]
        }));
        assert_eq!(
            result,
            AnalysisResult {
                ats_score: 82,
                summary: "Strong backend profile.".to_string(),
                strengths: vec!["Quantified impact".to_string()],
                weaknesses: vec!["No skills section".to_string()],
                suggestions: vec!["Add a skills section".to_string()],
            }
        );
    }

    #[test]
    fn test_score_is_clamped() {
        assert_eq!(normalize(json!({"atsScore": 150})).ats_score, 100);
        assert_eq!(normalize(json!({"atsScore": -20})).ats_score, 0);
        assert_eq!(normalize(json!({"atsScore": 100})).ats_score, 100);
    }

    #[test]
    fn test_score_parses_like_an_integer() {
        assert_eq!(normalize(json!({"atsScore": 87.9})).ats_score, 87);
        assert_eq!(normalize(json!({"atsScore": "85"})).ats_score, 85);
        assert_eq!(normalize(json!({"atsScore": " 72/100"})).ats_score, 72);
        assert_eq!(normalize(json!({"atsScore": "+64"})).ats_score, 64);
        assert_eq!(normalize(json!({"atsScore": "-5"})).ats_score, 0);
    }

    #[test]
    fn test_non_numeric_score_defaults_to_zero() {
        assert_eq!(normalize(json!({"atsScore": "N/A"})).ats_score, 0);
        assert_eq!(normalize(json!({"atsScore": null})).ats_score, 0);
        assert_eq!(normalize(json!({"atsScore": true})).ats_score, 0);
        assert_eq!(normalize(json!({"atsScore": [90]})).ats_score, 0);
        assert_eq!(normalize(json!({})).ats_score, 0);
    }

    #[test]
    fn test_missing_fields_get_fallbacks() {
        let result = normalize(json!({"atsScore": "N/A", "strengths": ["Clear layout"]}));
        assert_eq!(result.summary, FALLBACK_SUMMARY);
        assert_eq!(result.strengths, vec!["Clear layout"]);
        assert_eq!(result.weaknesses, vec![FALLBACK_WEAKNESS]);
        assert_eq!(result.suggestions, vec![FALLBACK_SUGGESTION]);
        assert_invariants(&result);
    }

    #[test]
    fn test_non_array_list_gets_fallback() {
        let result = normalize(json!({
            "suggestions": "Add keywords and quantify achievements",
            "weaknesses": {"formatting": "tables"}
        }));
        assert_eq!(result.suggestions, vec![FALLBACK_SUGGESTION]);
        assert_eq!(result.weaknesses, vec![FALLBACK_WEAKNESS]);
        assert_invariants(&result);
    }

    #[test]
    fn test_empty_or_blank_list_gets_fallback() {
        let result = normalize(json!({"strengths": [], "weaknesses": ["", "  ", null]}));
        assert_eq!(result.strengths, vec![FALLBACK_STRENGTH]);
        assert_eq!(result.weaknesses, vec![FALLBACK_WEAKNESS]);
    }

    #[test]
    fn test_lists_keep_first_six_entries() {
        let result = normalize(json!({
            "strengths": ["a", "b", "c", "d", "e", "f", "g", "h"]
        }));
        assert_eq!(result.strengths, vec!["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn test_non_string_entries_are_stringified() {
        let result = normalize(json!({"strengths": [42, "Rust", {"k": "v"}]}));
        assert_eq!(result.strengths, vec!["42", "Rust", r#"{"k":"v"}"#]);
    }

    #[test]
    fn test_summary_is_truncated_to_limit() {
        let long = "é".repeat(1500);
        let result = normalize(json!({"summary": long}));
        assert_eq!(result.summary.chars().count(), MAX_SUMMARY_CHARS);
    }

    #[test]
    fn test_blank_summary_gets_fallback() {
        assert_eq!(normalize(json!({"summary": "   "})).summary, FALLBACK_SUMMARY);
        assert_eq!(normalize(json!({"summary": false})).summary, FALLBACK_SUMMARY);
    }

    #[test]
    fn test_garbage_reply_still_satisfies_invariants() {
        let result = normalize(json!({
            "atsScore": "excellent",
            "summary": ["not", "a", "string"],
            "strengths": null,
            "weaknesses": 3,
            "suggestions": [null, null]
        }));
        assert_eq!(result.ats_score, 0);
        assert_invariants(&result);
    }
}
