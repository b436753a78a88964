//! Resume text extraction: turns an uploaded PDF or DOCX into plain text.
//!
//! Extraction is an ordered chain of strategies. The chain stops at the first strategy
//! that yields usable text, so adding a new fallback never touches the callers.
//! PDF chain: text objects → printable-run scrape → vision model. DOCX chain: raw text.

pub mod docx;
#[cfg(test)]
pub mod fixtures;
pub mod pdf;
pub mod prompts;
pub mod vision;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, info};

use crate::extraction::docx::DocxExtractor;
use crate::extraction::pdf::{PrintableRunExtractor, TextObjectExtractor};
use crate::extraction::vision::VisionExtractor;
use crate::llm_client::CompletionModel;

/// Upload ceiling: 5 MiB.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
/// Minimum trimmed length of extracted text before analysis may run.
pub const MIN_TEXT_CHARS: usize = 50;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Pdf,
    Docx,
}

impl MediaType {
    /// Maps a declared content type to a supported media type.
    /// Parameters such as `; charset=binary` are ignored.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        if essence.eq_ignore_ascii_case(PDF_MIME) {
            Some(MediaType::Pdf)
        } else if essence.eq_ignore_ascii_case(DOCX_MIME) {
            Some(MediaType::Docx)
        } else {
            None
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            MediaType::Pdf => PDF_MIME,
            MediaType::Docx => DOCX_MIME,
        }
    }
}

/// Why an upload was refused before any extraction ran.
/// The display strings are shown to the caller as-is.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("No resume file uploaded.")]
    Missing,

    #[error("Unsupported file type. Please upload a PDF or DOCX file.")]
    UnsupportedType { declared: Option<String> },

    #[error("File too large. Maximum size is 5MB.")]
    TooLarge,
}

/// A validated, request-scoped upload. Never persisted.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    bytes: Bytes,
    media_type: MediaType,
}

impl UploadedDocument {
    /// Validates the declared content type and size of an uploaded file.
    pub fn new(bytes: Bytes, content_type: Option<&str>) -> Result<Self, UploadError> {
        let media_type = content_type.and_then(MediaType::from_mime).ok_or_else(|| {
            UploadError::UnsupportedType {
                declared: content_type.map(str::to_string),
            }
        })?;

        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(UploadError::TooLarge);
        }

        Ok(Self { bytes, media_type })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMethod {
    StructuralPdf,
    VisionPdf,
    Docx,
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExtractionMethod::StructuralPdf => "Standard PDF parsing",
            ExtractionMethod::VisionPdf => "Vision-based extraction",
            ExtractionMethod::Docx => "DOCX extraction",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    pub content: String,
    pub method: ExtractionMethod,
}

impl ExtractedText {
    /// Character count of the content with surrounding whitespace removed.
    pub fn trimmed_len(&self) -> usize {
        self.content.trim().chars().count()
    }

    pub fn is_sufficient(&self) -> bool {
        self.trimmed_len() >= MIN_TEXT_CHARS
    }
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("{strategy} recovered {chars} characters, needs more than {required}")]
    InsufficientText {
        strategy: &'static str,
        chars: usize,
        required: usize,
    },

    #[error("DOCX could not be read: {0}")]
    Docx(String),

    #[error("vision extraction failed: {0}")]
    Vision(String),

    #[error("every extraction strategy failed ({0})")]
    Exhausted(String),
}

/// One way of turning document bytes into text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    async fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractionError>;
}

/// Ordered list of extraction strategies, tried until one succeeds.
pub struct ExtractorChain {
    strategies: Vec<Box<dyn TextExtractor>>,
}

impl ExtractorChain {
    pub fn new(strategies: Vec<Box<dyn TextExtractor>>) -> Self {
        Self { strategies }
    }

    /// The standard chain for a media type. Only the PDF chain reaches the vision model.
    pub fn for_media_type(media_type: MediaType, model: Arc<dyn CompletionModel>) -> Self {
        let strategies: Vec<Box<dyn TextExtractor>> = match media_type {
            MediaType::Pdf => vec![
                Box::new(TextObjectExtractor),
                Box::new(PrintableRunExtractor),
                Box::new(VisionExtractor::new(model)),
            ],
            MediaType::Docx => vec![Box::new(DocxExtractor)],
        };
        Self::new(strategies)
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub async fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractionError> {
        let mut failures = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            match strategy.extract(bytes).await {
                Ok(text) => {
                    info!(
                        strategy = strategy.name(),
                        method = %text.method,
                        chars = text.trimmed_len(),
                        "text extracted"
                    );
                    return Ok(text);
                }
                Err(e) => {
                    debug!(strategy = strategy.name(), error = %e, "extraction strategy failed");
                    failures.push(format!("{}: {e}", strategy.name()));
                }
            }
        }

        Err(ExtractionError::Exhausted(failures.join("; ")))
    }
}

/// Extracts text from a validated upload using the standard chain for its media type.
pub async fn extract(
    document: &UploadedDocument,
    model: Arc<dyn CompletionModel>,
) -> Result<ExtractedText, ExtractionError> {
    let chain = ExtractorChain::for_media_type(document.media_type(), model);
    debug!(strategies = ?chain.strategy_names(), "extraction chain selected");
    chain.extract(document.bytes()).await
}

/// Collapses every whitespace run to a single space and trims the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
