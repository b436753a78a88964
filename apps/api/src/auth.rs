//! Session verification. Identity is owned by an external provider; this service only
//! checks the bearer token a request carries.

use std::collections::HashMap;

use async_trait::async_trait;
use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::errors::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
}

#[async_trait]
pub trait SessionVerifier: Send + Sync {
    /// Returns the session a token belongs to, or `None` if it is not valid.
    async fn verify(&self, token: &str) -> Option<Session>;
}

/// Accepts a fixed set of tokens issued out of band, configured via `AUTH_TOKENS`.
pub struct StaticTokenVerifier {
    users_by_token: HashMap<String, String>,
}

impl StaticTokenVerifier {
    /// Builds the verifier from `(user_id, token)` pairs.
    pub fn new(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            users_by_token: pairs
                .into_iter()
                .map(|(user_id, token)| (token, user_id))
                .collect(),
        }
    }

    pub fn token_count(&self) -> usize {
        self.users_by_token.len()
    }
}

#[async_trait]
impl SessionVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Option<Session> {
        self.users_by_token.get(token).map(|user_id| Session {
            user_id: user_id.clone(),
        })
    }
}

/// Resolves the `Authorization: Bearer <token>` header to a session.
pub async fn authenticate(
    verifier: &dyn SessionVerifier,
    headers: &HeaderMap,
) -> Result<Session, AppError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::Unauthorized)?;

    verifier.verify(token).await.ok_or(AppError::Unauthorized)
}
