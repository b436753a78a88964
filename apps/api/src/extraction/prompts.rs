// LLM prompt templates for the extraction module.

/// Instruction sent alongside an inline PDF when structural extraction found nothing.
pub const VISION_TRANSCRIBE_PROMPT: &str = "Extract all text from this PDF document. \
    Return only the extracted text content, formatted as plain text suitable for resume analysis.";
