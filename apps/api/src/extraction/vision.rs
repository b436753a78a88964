//! Vision fallback: asks the hosted multimodal model to transcribe a PDF.
//!
//! Slower and costlier than the structural strategies, so it only ever runs last.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::extraction::prompts::VISION_TRANSCRIBE_PROMPT;
use crate::extraction::{
    ExtractedText, ExtractionError, ExtractionMethod, TextExtractor, MIN_TEXT_CHARS, PDF_MIME,
};
use crate::llm_client::CompletionModel;

pub struct VisionExtractor {
    model: Arc<dyn CompletionModel>,
}

impl VisionExtractor {
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self { model }
    }
}

#[async_trait]
impl TextExtractor for VisionExtractor {
    fn name(&self) -> &'static str {
        "pdf-vision"
    }

    async fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
        let reply = self
            .model
            .generate_from_document(VISION_TRANSCRIBE_PROMPT, bytes, PDF_MIME)
            .await
            .map_err(|e| {
                warn!("Vision extraction call failed: {e}");
                ExtractionError::Vision(e.to_string())
            })?;

        let content = reply.trim().to_string();
        let chars = content.chars().count();
        if chars < MIN_TEXT_CHARS {
            return Err(ExtractionError::Vision(format!(
                "model returned {chars} characters, needs at least {MIN_TEXT_CHARS}"
            )));
        }

        Ok(ExtractedText {
            content,
            method: ExtractionMethod::VisionPdf,
        })
    }
}
