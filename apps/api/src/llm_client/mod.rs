/// LLM Client: the single point of entry for all hosted-model calls.
///
/// ARCHITECTURAL RULE: No other module may call the Generative Language API directly.
/// Handlers and pipelines depend on the `CompletionModel` trait, never on `GeminiClient`.
///
/// Model: gemini-2.5-flash (hardcoded; do not make configurable to prevent drift)
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

use prompts::DEFAULT_SYSTEM_INSTRUCTION;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// The model used for all LLM calls.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "gemini-2.5-flash";
const MAX_OUTPUT_TOKENS: u32 = 8192;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Who authored a conversation turn. Serialized the way the API expects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One message of a multi-turn conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

/// The capabilities the rest of the service needs from a hosted model.
///
/// `GeminiClient` is the production implementation; tests swap in a scripted fake.
/// Every method performs at most one upstream request. There is no retry layer.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Single prompt in, text out.
    async fn generate_text(&self, prompt: &str) -> Result<String, LlmError>;

    /// Prompt plus one inline binary document (e.g. a PDF), text out.
    async fn generate_from_document(
        &self,
        prompt: &str,
        document: &[u8],
        mime_type: &str,
    ) -> Result<String, LlmError>;

    /// Multi-turn conversation under a custom system instruction.
    async fn converse(&self, system: &str, turns: &[ChatTurn]) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<Role>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Part<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData<'a>>,
}

impl<'a> Part<'a> {
    fn text(text: &'a str) -> Self {
        Self {
            text: Some(text),
            inline_data: None,
        }
    }

    fn inline(mime_type: &'a str, data: String) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData { mime_type, data }),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl LlmResponse {
    /// Concatenates the text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// Wraps the Generative Language `generateContent` REST endpoint.
/// Built once at startup and shared by every request.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, api_key })
    }

    /// Makes a single raw call to the API, returning the full response object.
    async fn call(
        &self,
        system: &str,
        contents: Vec<Content<'_>>,
    ) -> Result<LlmResponse, LlmError> {
        let request_body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part::text(system)],
            },
            contents,
            generation_config: GenerationConfig {
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let response = self
            .client
            .post(format!("{GEMINI_API_BASE}/{MODEL}:generateContent"))
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!("LLM API returned {}: {}", status, message);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await?;

        if let Some(usage) = &llm_response.usage_metadata {
            debug!(
                "LLM call succeeded: prompt_tokens={}, output_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        Ok(llm_response)
    }

    async fn call_text(
        &self,
        system: &str,
        contents: Vec<Content<'_>>,
    ) -> Result<String, LlmError> {
        self.call(system, contents)
            .await?
            .text()
            .ok_or(LlmError::EmptyContent)
    }
}

#[async_trait]
impl CompletionModel for GeminiClient {
    async fn generate_text(&self, prompt: &str) -> Result<String, LlmError> {
        let contents = vec![Content {
            role: Some(Role::User),
            parts: vec![Part::text(prompt)],
        }];
        self.call_text(DEFAULT_SYSTEM_INSTRUCTION, contents).await
    }

    async fn generate_from_document(
        &self,
        prompt: &str,
        document: &[u8],
        mime_type: &str,
    ) -> Result<String, LlmError> {
        let contents = vec![Content {
            role: Some(Role::User),
            parts: vec![
                Part::text(prompt),
                Part::inline(mime_type, BASE64_STANDARD.encode(document)),
            ],
        }];
        self.call_text(DEFAULT_SYSTEM_INSTRUCTION, contents).await
    }

    async fn converse(&self, system: &str, turns: &[ChatTurn]) -> Result<String, LlmError> {
        let contents = turns
            .iter()
            .map(|turn| Content {
                role: Some(turn.role),
                parts: vec![Part::text(&turn.content)],
            })
            .collect();
        self.call_text(system, contents).await
    }
}

/// Strips a markdown code fence wrapped around a JSON reply.
///
/// Everything up to and including the first ```` ``` ```` (optionally tagged `json`) is
/// dropped, as is the closing fence and anything after it. Unfenced text passes through.
pub fn strip_json_fences(text: &str) -> &str {
    static OPENING_FENCE: OnceLock<Regex> = OnceLock::new();
    static CLOSING_FENCE: OnceLock<Regex> = OnceLock::new();
    let opening =
        OPENING_FENCE.get_or_init(|| Regex::new(r"(?s)^.*?```(?i:json)?\s*").unwrap());
    let closing = CLOSING_FENCE.get_or_init(|| Regex::new(r"(?s)\s*```.*$").unwrap());

    let text = text.trim();
    let start = opening.find(text).map_or(0, |m| m.end());
    let rest = &text[start..];
    let end = closing.find(rest).map_or(rest.len(), |m| m.start());
    rest[..end].trim()
}
