//! Handlers for the unauthenticated `/api/public` routes.

use crate::{
    auth::{check_credentials, issue_token},
    errors::AppError,
    models::validation::{describe, validate_credentials},
    state::AppState,
};
use axum::{
    Json,
    body::Body,
    extract::{Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct FileQuery {
    pub path: Option<String>,
}

/// `GET /api/public/file?path=` streams any stored object back with its
/// content type.
pub async fn get_file(
    State(state): State<AppState>,
    Query(query): Query<FileQuery>,
) -> Result<Response, AppError> {
    let path = query.path.unwrap_or_default();
    let object = state.blog.read_file(&path).await?;

    let content_type = HeaderValue::from_str(object.content_type())
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let filename = path.rsplit('/').next().unwrap_or(path.as_str());
    let disposition = HeaderValue::from_str(&content_disposition(filename))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    let mut response = Response::new(Body::from(object.body));
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, content_type);
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(object.info.size_bytes));
    if let Ok(etag) = HeaderValue::from_str(&format!("\"{}\"", object.info.etag)) {
        headers.insert(header::ETAG, etag);
    }
    Ok(response)
}

/// `attachment; filename="..."` as a quoted-string: `"` and `\` are
/// backslash-escaped, anything outside printable ASCII becomes `_`.
fn content_disposition(filename: &str) -> String {
    let mut quoted = String::with_capacity(filename.len());
    for c in filename.chars() {
        match c {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            ' '..='~' => quoted.push(c),
            _ => quoted.push('_'),
        }
    }
    format!("attachment; filename=\"{}\"", quoted)
}

#[derive(Serialize, Debug)]
pub struct TokenResponse {
    pub token: String,
}

/// `POST /api/public/login` with body `{"username": ..., "password": ...}`.
pub async fn login(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let credentials = validate_credentials(&body)
        .into_result()
        .map_err(|errors| AppError::bad_request(describe(&errors)))?;

    let credentials = match credentials {
        Some(credentials) if check_credentials(&credentials, &state.auth) => credentials,
        rejected => {
            let username = rejected.as_ref().map(|c| c.username.as_str()).unwrap_or("");
            warn!(username = %username, "login rejected");
            return Err(AppError::unauthorized("invalid username or password"));
        }
    };

    let token = issue_token(&credentials.username, &state.auth.jwt_secret)
        .map_err(|err| AppError::internal(format!("could not sign token: {}", err)))?;
    info!(username = %credentials.username, "admin logged in");
    Ok(Json(TokenResponse { token }))
}
