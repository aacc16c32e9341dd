//! Errors raised by the content repositories.

use thiserror::Error;

use super::object_store::StoreError;
use crate::models::validation::{FieldError, describe};

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("invalid request: {}", describe(.0))]
    Invalid(Vec<FieldError>),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("article `{0}` not found")]
    ArticleNotFound(String),
    #[error("article `{0}` already exists")]
    ArticleExists(String),
    /// An index object that every initialized deployment has is gone.
    #[error("index object `{0}` not found; deployment uninitialized or corrupted")]
    IndexMissing(String),
    #[error("backup `{0}` not found")]
    BackupMissing(String),
    #[error("object `{0}` not found")]
    ObjectNotFound(String),
    #[error("object `{key}` is not valid JSON: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<Vec<FieldError>> for ContentError {
    fn from(errors: Vec<FieldError>) -> Self {
        Self::Invalid(errors)
    }
}

pub type ContentResult<T> = Result<T, ContentError>;
