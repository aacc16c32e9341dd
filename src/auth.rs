//! Admin authentication.
//!
//! `POST /api/public/login` trades the configured username/password for an
//! HS256 JWT valid for 24 hours. Every `/api/admin/*` request must carry it
//! as `Authorization: Bearer <token>`; anything else is rejected with 401
//! before the handler runs.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

use crate::{errors::AppError, models::validation::Credentials, state::AppState};

/// Lifetime of an issued token.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Static admin credentials and the token signing secret.
#[derive(Clone)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
    pub jwt_secret: String,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .finish()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    pub username: String,
    /// Expiry, epoch seconds.
    pub exp: i64,
}

/// Sign a token for `subject` that expires in [`TOKEN_TTL_HOURS`].
pub fn issue_token(subject: &str, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        username: subject.to_string(),
        exp: (Utc::now() + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// True when `token` carries a valid signature for `secret` and has not
/// expired.
pub fn verify_token(token: &str, secret: &str) -> bool {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .is_ok()
}

/// Constant-time comparison; a length mismatch still does one comparison.
fn constant_time_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Check login credentials against the configured pair.
pub fn check_credentials(credentials: &Credentials, config: &AuthConfig) -> bool {
    let user_ok = constant_time_eq(&credentials.username, &config.username);
    let pass_ok = constant_time_eq(&credentials.password, &config.password);
    user_ok & pass_ok
}

/// Middleware guarding the admin router.
pub async fn require_bearer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let rejection = match request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        None => Some("missing authorization header"),
        Some(value) => match value.split_once(' ') {
            Some(("Bearer", token)) => (!verify_token(token, &state.auth.jwt_secret))
                .then_some("invalid or expired bearer token"),
            _ => Some("authorization header must use Bearer scheme"),
        },
    };
    let Some(rejection) = rejection else {
        return next.run(request).await;
    };

    tracing::warn!(
        method = %request.method(),
        path = %request.uri().path(),
        reason = rejection,
        "admin request rejected"
    );
    AppError::unauthorized(rejection).into_response()
}
