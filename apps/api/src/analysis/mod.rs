// Resume analysis: ATS scoring of extracted resume text via the hosted model.
// All LLM calls go through the `CompletionModel` trait, never direct HTTP calls here.

pub mod handlers;
pub mod normalize;
pub mod pipeline;
pub mod prompts;

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::analysis::normalize::normalize_analysis;
use crate::analysis::prompts::ATS_ANALYSIS_PROMPT_TEMPLATE;
use crate::extraction::normalize_whitespace;
use crate::llm_client::{strip_json_fences, CompletionModel, LlmError};

/// Hard ceiling on how much resume text is sent upstream.
pub const MAX_ANALYSIS_CHARS: usize = 12_000;

/// The normalized ATS analysis returned to callers. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub ats_score: u32,
    pub summary: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("model call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("model reply is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("model reply is JSON but not an object")]
    NotAnObject,
}

/// Scores resume text. One upstream call; malformed replies are not retried.
pub async fn analyze_resume(
    text: &str,
    model: &dyn CompletionModel,
) -> Result<AnalysisResult, AnalysisError> {
    let prompt = build_analysis_prompt(text);
    let reply = model.generate_text(&prompt).await?;

    let json = strip_json_fences(&reply);
    let parsed: serde_json::Value = serde_json::from_str(json)?;
    let object = parsed.as_object().ok_or(AnalysisError::NotAnObject)?;

    let result = normalize_analysis(object);
    debug!(ats_score = result.ats_score, "analysis normalized");
    Ok(result)
}

pub fn build_analysis_prompt(text: &str) -> String {
    let cleaned = clean_resume_text(text);
    let excerpt = truncate_chars(&cleaned, MAX_ANALYSIS_CHARS);
    ATS_ANALYSIS_PROMPT_TEMPLATE.replace("{resume_text}", excerpt)
}

/// Replaces everything outside word characters, whitespace and `.,@-()+#&%$` with a
/// space, then collapses whitespace.
pub fn clean_resume_text(text: &str) -> String {
    static DISALLOWED: OnceLock<Regex> = OnceLock::new();
    let disallowed = DISALLOWED.get_or_init(|| Regex::new(r"[^\w\s.,@()+#&%$\-]").unwrap());
    normalize_whitespace(&disallowed.replace_all(text, " "))
}

/// The longest prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
