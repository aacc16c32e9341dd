//! Handlers for the authenticated `/api/admin` routes.
//!
//! JSON bodies are taken as raw bytes and run through the validators in
//! `models::validation`, so a malformed body always yields a 400 listing
//! every offending field instead of an extractor rejection.

use crate::{
    errors::AppError,
    models::validation::{
        validate_article, validate_article_ref, validate_attachment_ref, validate_relink,
        validate_site,
    },
    services::{content_error::ContentError, recovery::RecoveryReport},
    state::AppState,
};
use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, header},
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Body of every successful admin mutation.
#[derive(Serialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

fn done(message: impl Into<String>) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: message.into(),
    })
}

type AdminResult = Result<Json<MessageResponse>, AppError>;

/// `PUT /api/admin/avatar`
pub async fn put_avatar(State(state): State<AppState>, body: Bytes) -> AdminResult {
    state.blog.put_avatar(body).await?;
    Ok(done("avatar updated"))
}

/// `PUT /api/admin/site`
pub async fn put_site(State(state): State<AppState>, body: Bytes) -> AdminResult {
    let site = validate_site(&body)
        .into_result()
        .map_err(ContentError::from)?;
    state.blog.update_site(site).await?;
    Ok(done("site updated"))
}

/// `POST /api/admin/article`
pub async fn create_article(State(state): State<AppState>, body: Bytes) -> AdminResult {
    let article = validate_article(&body)
        .into_result()
        .map_err(ContentError::from)?;
    state.blog.articles.create(&article).await?;
    Ok(done(format!("article {} created", article.uuid)))
}

/// `PUT /api/admin/article`
pub async fn update_article(State(state): State<AppState>, body: Bytes) -> AdminResult {
    let article = validate_article(&body)
        .into_result()
        .map_err(ContentError::from)?;
    state.blog.articles.update(&article).await?;
    Ok(done(format!("article {} updated", article.uuid)))
}

/// `PUT /api/admin/article/stage`
pub async fn stage_article(State(state): State<AppState>, body: Bytes) -> AdminResult {
    let article = validate_article(&body)
        .into_result()
        .map_err(ContentError::from)?;
    state.blog.articles.stage(&article).await?;
    Ok(done(format!("article {} staged", article.uuid)))
}

/// `DELETE /api/admin/article` with body `{"uuid": ...}`
pub async fn delete_article(State(state): State<AppState>, body: Bytes) -> AdminResult {
    let target = validate_article_ref(&body)
        .into_result()
        .map_err(ContentError::from)?;
    state.blog.articles.delete(&target.uuid).await?;
    Ok(done(format!("article {} deleted", target.uuid)))
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub filename: Option<String>,
    pub uuid: Option<String>,
}

/// `POST /api/admin/attachment?filename=&uuid=` with the raw file as body.
pub async fn upload_attachment(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> AdminResult {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let record = state
        .blog
        .attachments
        .upload(query.filename.as_deref(), body, query.uuid, content_type)
        .await?;
    Ok(done(format!("attachment {} uploaded", record.filename)))
}

/// `DELETE /api/admin/attachment` with body `{"filename": ...}`
pub async fn delete_attachment(State(state): State<AppState>, body: Bytes) -> AdminResult {
    let target = validate_attachment_ref(&body)
        .into_result()
        .map_err(ContentError::from)?;
    state.blog.attachments.delete(&target.filename).await?;
    Ok(done(format!("attachment {} deleted", target.filename)))
}

/// `PUT /api/admin/attachment` with body `{"filename": ..., "article_uuid": ...}`
pub async fn relink_attachment(State(state): State<AppState>, body: Bytes) -> AdminResult {
    let relink = validate_relink(&body)
        .into_result()
        .map_err(ContentError::from)?;
    state
        .blog
        .attachments
        .relink(&relink.filename, &relink.article_uuid)
        .await?;
    Ok(done(format!(
        "attachment {} linked to {}",
        relink.filename, relink.article_uuid
    )))
}

/// `PUT /api/admin/init`
pub async fn init(State(state): State<AppState>) -> AdminResult {
    state.blog.initialize().await?;
    Ok(done("indexes initialized"))
}

#[derive(Serialize, Debug)]
pub struct RecoverResponse {
    pub message: String,
    pub restored: RecoveryReport,
}

/// `PUT /api/admin/recover`
pub async fn recover(State(state): State<AppState>) -> Result<Json<RecoverResponse>, AppError> {
    let restored = state.blog.recover().await?;
    Ok(Json(RecoverResponse {
        message: "indexes restored from backup".into(),
        restored,
    }))
}
