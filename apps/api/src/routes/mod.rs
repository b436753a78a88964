pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers::handle_analyze_resume;
use crate::chat::handlers::handle_chat;
use crate::state::AppState;

/// Body limit for the upload route. Sits above the 5 MiB file ceiling so an oversize
/// file still reaches validation and gets a descriptive 400.
pub const MAX_REQUEST_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/analyze-resume",
            post(handle_analyze_resume).layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES)),
        )
        .route("/api/chat", post(handle_chat))
        .with_state(state)
}
