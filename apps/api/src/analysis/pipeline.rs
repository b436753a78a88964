//! Resume analysis pipeline: validated upload → extraction chain → ATS analysis.
//!
//! Stages run strictly in order and nothing is retried. Extraction failures are
//! recovered inside the chain; only total exhaustion reaches the caller, as a 400.

use std::sync::Arc;

use tracing::{info, warn};

use crate::analysis::{analyze_resume, AnalysisResult};
use crate::errors::AppError;
use crate::extraction::{self, MediaType, UploadedDocument, MIN_TEXT_CHARS};
use crate::llm_client::CompletionModel;

const PDF_REMEDIATION: &str = "Failed to extract text from the file. \
    If the PDF is scanned or image-only, export it with a selectable text layer or upload a DOCX version. \
    Also check that the file is not corrupted or password-protected.";

const DOCX_REMEDIATION: &str = "Failed to extract text from the file. \
    Please make sure it is a valid, uncorrupted DOCX document, or convert it to PDF and try again.";

pub struct ResumeAnalyzer {
    model: Arc<dyn CompletionModel>,
}

impl ResumeAnalyzer {
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self { model }
    }

    pub async fn analyze_upload(
        &self,
        document: &UploadedDocument,
    ) -> Result<AnalysisResult, AppError> {
        info!(
            media_type = document.media_type().mime(),
            size_bytes = document.size_bytes(),
            "analyzing resume upload"
        );

        let extracted = extraction::extract(document, self.model.clone())
            .await
            .map_err(|e| {
                warn!("Text extraction failed: {e}");
                AppError::BadRequest(remediation(document.media_type()).to_string())
            })?;

        if !extracted.is_sufficient() {
            warn!(
                method = %extracted.method,
                chars = extracted.trimmed_len(),
                "extracted text below minimum"
            );
            return Err(AppError::BadRequest(format!(
                "Could not extract sufficient readable text from the resume. \
                 Please upload a file with at least {MIN_TEXT_CHARS} characters of selectable text."
            )));
        }

        analyze_resume(&extracted.content, self.model.as_ref())
            .await
            .map_err(|e| AppError::Llm(format!("Resume analysis failed: {e}")))
    }
}

fn remediation(media_type: MediaType) -> &'static str {
    match media_type {
        MediaType::Pdf => PDF_REMEDIATION,
        MediaType::Docx => DOCX_REMEDIATION,
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::extraction::fixtures::{
        docx_with_paragraphs, image_only_pdf, text_layer_pdf, SUMMARY_LINES,
    };
    use crate::extraction::{DOCX_MIME, PDF_MIME};
    use crate::llm_client::testing::{Call, ScriptedModel};
    use crate::llm_client::LlmError;

    const ANALYSIS_REPLY: &str = r#"{"atsScore": 74, "summary": "Solid backend resume.",
        "strengths": ["Quantified impact"], "weaknesses": ["Dense layout"],
        "suggestions": ["Add a skills section"]}"#;

    const VISION_TRANSCRIPT: &str = "Jane Doe\nSenior Backend Engineer\n\
        Eight years building distributed payment systems in Rust and Go.";

    fn upload(bytes: Vec<u8>, mime: &str) -> UploadedDocument {
        UploadedDocument::new(Bytes::from(bytes), Some(mime)).unwrap()
    }

    fn analyzer(model: &Arc<ScriptedModel>) -> ResumeAnalyzer {
        ResumeAnalyzer::new(model.clone())
    }

    fn bad_request_message(err: AppError) -> String {
        match err {
            AppError::BadRequest(msg) => msg,
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_text_layer_pdf_is_analyzed_without_vision() {
        let model = Arc::new(ScriptedModel::new().reply(ANALYSIS_REPLY));
        let doc = upload(text_layer_pdf(SUMMARY_LINES), PDF_MIME);

        let result = analyzer(&model).analyze_upload(&doc).await.unwrap();
        assert_eq!(result.ats_score, 74);

        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert!(matches!(&calls[0], Call::Text(prompt) if prompt.contains("zero downtime")));
    }

    #[tokio::test]
    async fn test_image_only_pdf_falls_back_to_vision() {
        let model = Arc::new(
            ScriptedModel::new()
                .reply(VISION_TRANSCRIPT)
                .reply(ANALYSIS_REPLY),
        );
        let pdf = image_only_pdf();
        let len = pdf.len();
        let doc = upload(pdf, PDF_MIME);

        let result = analyzer(&model).analyze_upload(&doc).await.unwrap();
        assert_eq!(result.summary, "Solid backend resume.");

        let calls = model.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(&calls[0], Call::Document { len: l, .. } if *l == len));
        assert!(matches!(&calls[1], Call::Text(prompt) if prompt.contains("payment systems")));
    }

    #[tokio::test]
    async fn test_image_only_pdf_with_short_vision_transcript_is_rejected() {
        let model = Arc::new(ScriptedModel::new().reply("Page 1"));
        let doc = upload(image_only_pdf(), PDF_MIME);

        let err = analyzer(&model).analyze_upload(&doc).await.unwrap_err();
        let message = bad_request_message(err);
        assert!(message.contains("scanned or image-only"));

        // Vision ran once; analysis never did.
        assert_eq!(model.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_vision_outage_is_rejected_as_bad_request() {
        let model = Arc::new(ScriptedModel::new().fail(LlmError::Api {
            status: 503,
            message: "unavailable".into(),
        }));
        let doc = upload(image_only_pdf(), PDF_MIME);

        let err = analyzer(&model).analyze_upload(&doc).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_short_docx_never_reaches_analysis() {
        let model = Arc::new(ScriptedModel::new().reply(ANALYSIS_REPLY));
        let doc = upload(
            docx_with_paragraphs(&["Short resume with only forty characters."]),
            DOCX_MIME,
        );

        let err = analyzer(&model).analyze_upload(&doc).await.unwrap_err();
        assert!(bad_request_message(err).contains("sufficient readable text"));
        assert!(model.calls().is_empty());
    }

    #[tokio::test]
    async fn test_docx_is_analyzed() {
        let model = Arc::new(ScriptedModel::new().reply(ANALYSIS_REPLY));
        let doc = upload(docx_with_paragraphs(SUMMARY_LINES), DOCX_MIME);

        let result = analyzer(&model).analyze_upload(&doc).await.unwrap();
        assert_eq!(result.ats_score, 74);
        assert_eq!(model.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_docx_gets_docx_remediation() {
        let model = Arc::new(ScriptedModel::new());
        let doc = upload(b"not a zip archive at all".to_vec(), DOCX_MIME);

        let err = analyzer(&model).analyze_upload(&doc).await.unwrap_err();
        assert!(bad_request_message(err).contains("DOCX"));
        assert!(model.calls().is_empty());
    }

    #[tokio::test]
    async fn test_fenced_out_of_range_score_is_clamped() {
        let reply = format!("```json\n{}\n```", ANALYSIS_REPLY.replace("74", "150"));
        let model = Arc::new(ScriptedModel::new().reply(reply));
        let doc = upload(text_layer_pdf(SUMMARY_LINES), PDF_MIME);

        let result = analyzer(&model).analyze_upload(&doc).await.unwrap();
        assert_eq!(result.ats_score, 100);
    }

    #[tokio::test]
    async fn test_malformed_analysis_is_a_service_error() {
        let model = Arc::new(ScriptedModel::new().reply("{ not json"));
        let doc = upload(text_layer_pdf(SUMMARY_LINES), PDF_MIME);

        let err = analyzer(&model).analyze_upload(&doc).await.unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
        assert_eq!(model.calls().len(), 1);
    }
}
