//! Authentication extractors
//!
//! Two guards: a session bearer token (HS256 JWT whose `sub` is the user id)
//! for the admin panel, and a static integration key for the assignment
//! endpoint.

use std::sync::Arc;

use axum::{async_trait, extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use codetix_crm::EntityId;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, ApiState};

/// Session token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub exp: usize,
}

pub fn issue_session_token(
    secret: &str,
    user_id: &str,
    ttl: chrono::Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = SessionClaims {
        sub: user_id.to_string(),
        exp: (chrono::Utc::now() + ttl).timestamp() as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
}

pub fn verify_session_token(secret: &str, token: &str) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
    let token_data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

fn bearer(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer").unwrap_or(value).trim();
    (!token.is_empty()).then_some(token)
}

/// Authenticated user id from the session token
#[derive(Debug, Clone)]
pub struct Session(pub EntityId);

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<ApiState>) -> Result<Self, Self::Rejection> {
        let secret = &state.auth.session_secret;
        if secret.is_empty() {
            return Err(ApiError::Unauthenticated);
        }

        let token = bearer(parts).ok_or(ApiError::Unauthenticated)?;
        let claims = verify_session_token(secret, token).map_err(|e| {
            tracing::debug!(error = %e, "Rejected session token");
            ApiError::Unauthenticated
        })?;

        Ok(Session(EntityId::from_string(claims.sub)))
    }
}

/// Caller presented the configured integration key
#[derive(Debug, Clone, Copy)]
pub struct LeadsApiKey;

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for LeadsApiKey {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<ApiState>) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.auth.leads_api_key.as_deref().filter(|k| !k.is_empty()) else {
            tracing::warn!("Assignment request refused: no leads API key configured");
            return Err(ApiError::InvalidApiKey);
        };

        match bearer(parts) {
            Some(token) if token == expected => Ok(LeadsApiKey),
            _ => Err(ApiError::InvalidApiKey),
        }
    }
}
