mod analysis;
mod auth;
mod chat;
mod config;
mod errors;
mod extraction;
mod llm_client;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::StaticTokenVerifier;
use crate::config::Config;
use crate::llm_client::{CompletionModel, GeminiClient};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Career API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client (optional: routes answer 500 without it)
    let model = config
        .gemini_api_key
        .clone()
        .map(GeminiClient::new)
        .transpose()?
        .map(|client| Arc::new(client) as Arc<dyn CompletionModel>);
    match &model {
        Some(_) => info!("LLM client initialized (model: {})", llm_client::MODEL),
        None => warn!("GEMINI_API_KEY is not set; analysis and chat will be unavailable"),
    }

    let sessions = StaticTokenVerifier::new(config.auth_tokens.clone());
    info!("Session verifier loaded {} token(s)", sessions.token_count());

    let state = AppState {
        model,
        sessions: Arc::new(sessions),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
