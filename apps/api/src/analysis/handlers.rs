use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::{HeaderMap, StatusCode},
    Json,
};
use tracing::{info, warn, Instrument};
use uuid::Uuid;

use crate::analysis::pipeline::ResumeAnalyzer;
use crate::analysis::AnalysisResult;
use crate::auth::authenticate;
use crate::errors::AppError;
use crate::extraction::{UploadError, UploadedDocument};
use crate::state::AppState;

/// Name of the multipart field carrying the resume file.
pub const RESUME_FIELD: &str = "resume";

/// POST /api/analyze-resume
///
/// Guards run in a fixed order: model configured (500), session (401), upload (400).
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResult>, AppError> {
    let model = state.model.clone().ok_or(AppError::ServiceUnavailable)?;
    let session = authenticate(state.sessions.as_ref(), &headers).await?;

    let span = tracing::info_span!(
        "analyze_resume",
        request_id = %Uuid::new_v4(),
        user_id = %session.user_id
    );

    async move {
        let mut multipart = multipart.map_err(|rejection| {
            warn!("Rejected non-multipart upload: {rejection}");
            AppError::BadRequest(UploadError::Missing.to_string())
        })?;

        let document = read_resume_field(&mut multipart).await?;
        let result = ResumeAnalyzer::new(model).analyze_upload(&document).await?;

        info!(ats_score = result.ats_score, "resume analysis complete");
        Ok::<_, AppError>(Json(result))
    }
    .instrument(span)
    .await
}

/// Finds the `resume` field and validates it. Other fields are skipped.
async fn read_resume_field(multipart: &mut Multipart) -> Result<UploadedDocument, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return UploadedDocument::new(bytes, content_type.as_deref()).map_err(|e| {
            if let UploadError::UnsupportedType { declared } = &e {
                warn!(declared = ?declared, "unsupported upload type");
            }
            e.into()
        });
    }
    Err(UploadError::Missing.into())
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return UploadError::TooLarge.into();
    }
    warn!("Malformed multipart body: {e}");
    AppError::BadRequest(format!("Invalid upload: {}", e.body_text()))
}
