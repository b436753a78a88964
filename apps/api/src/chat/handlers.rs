use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use tracing::{info, warn, Instrument};
use uuid::Uuid;

use crate::auth::authenticate;
use crate::chat::{prepare_turns, reply_to, ChatRequest, ChatResponse};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let model = state.model.clone().ok_or(AppError::ServiceUnavailable)?;
    let session = authenticate(state.sessions.as_ref(), &headers).await?;

    let Json(request) = body.map_err(|rejection| {
        warn!("Rejected chat body: {rejection}");
        AppError::BadRequest(rejection.body_text())
    })?;
    let turns = prepare_turns(request.history).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let span = tracing::info_span!(
        "chat",
        request_id = %Uuid::new_v4(),
        user_id = %session.user_id,
        turns = turns.len()
    );

    async move {
        let reply = reply_to(&turns, model.as_ref())
            .await
            .map_err(|e| AppError::Llm(format!("Chat completion failed: {e}")))?;
        info!(reply_chars = reply.chars().count(), "chat reply sent");
        Ok::<_, AppError>(Json(ChatResponse { reply }))
    }
    .instrument(span)
    .await
}
