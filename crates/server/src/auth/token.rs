use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use super::{AuthError, User};
use crate::config::AuthSettings;

/// JWT claims understood by the community API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub exp: u64,
    pub iat: u64,
    pub iss: String,
}

impl From<Claims> for User {
    fn from(claims: Claims) -> Self {
        User {
            id: claims.sub,
            email: claims.email,
            username: claims.username,
        }
    }
}

/// Issues and verifies HS256 tokens for a single issuer.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
}

impl TokenService {
    pub fn new(secret: &str, issuer: impl Into<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
        }
    }

    /// Build the service from config, reading the secret from the configured env var.
    pub fn from_settings(settings: &AuthSettings) -> Result<Self> {
        let secret = settings.resolve_secret().with_context(|| {
            format!(
                "{} environment variable must be set to a non-empty secret",
                settings.secret_env
            )
        })?;
        Ok(Self::new(&secret, settings.issuer.clone()))
    }

    pub fn issue(&self, user: &User, ttl: Duration) -> Result<String> {
        let now = jsonwebtoken::get_current_timestamp();
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
            exp: now + ttl.as_secs(),
            iat: now,
            iss: self.issuer.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).context("failed to sign token")
    }

    pub fn verify(&self, token: &str) -> Result<User, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(User::from(data.claims))
    }

    /// Resolve the `Authorization` header into a user.
    ///
    /// Accepts both `Bearer <token>` and a raw token. Missing or invalid
    /// tokens yield `None` so the request continues anonymously.
    pub fn user_from_headers(&self, headers: &HeaderMap) -> Option<User> {
        let raw = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
        let token = raw.strip_prefix("Bearer ").unwrap_or(raw);
        if token.is_empty() {
            return None;
        }

        match self.verify(token) {
            Ok(user) => {
                tracing::debug!(user_id = %user.id, "authenticated request");
                Some(user)
            }
            Err(err) => {
                tracing::debug!("rejecting bearer token: {}", err);
                None
            }
        }
    }
}
