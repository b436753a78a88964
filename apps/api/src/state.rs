use std::sync::Arc;

use crate::auth::SessionVerifier;
use crate::llm_client::CompletionModel;

/// Shared application state injected into all route handlers via Axum extractors.
/// Immutable after startup; requests never write to it.
#[derive(Clone)]
pub struct AppState {
    /// `None` when `GEMINI_API_KEY` is unset. Model-backed routes then answer 500.
    pub model: Option<Arc<dyn CompletionModel>>,
    pub sessions: Arc<dyn SessionVerifier>,
}
