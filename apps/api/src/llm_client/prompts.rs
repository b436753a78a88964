// Shared prompt constants used by the LLM client itself.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// System instruction applied to single-shot text and document calls.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a professional AI assistant. \
    Always respond clearly, concisely, and professionally. \
    Return only the output requested, no extra explanations or notes.";
