use anyhow::{bail, Context, Result};

/// Application configuration loaded from environment variables.
/// Only malformed values fail startup; a missing `GEMINI_API_KEY` leaves the
/// model-backed routes answering 500 instead.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    /// `(user_id, token)` pairs accepted as bearer sessions.
    pub auth_tokens: Vec<(String, String)>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            auth_tokens: parse_auth_tokens(&optional_env("AUTH_TOKENS").unwrap_or_default())?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Reads a variable, treating unset and blank the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses `user_a:token1,user_b:token2`.
fn parse_auth_tokens(raw: &str) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((user_id, token)) = entry.split_once(':') else {
            bail!("AUTH_TOKENS entry '{entry}' must look like 'user_id:token'");
        };
        let (user_id, token) = (user_id.trim(), token.trim());
        if user_id.is_empty() || token.is_empty() {
            bail!("AUTH_TOKENS entry '{entry}' has an empty user id or token");
        }
        pairs.push((user_id.to_string(), token.to_string()));
    }
    Ok(pairs)
}
