//! The object store contract every backend satisfies.
//!
//! Keys are opaque strings; each single-key operation is atomic and
//! immediately visible to later reads of that key. Nothing spans keys.

use async_trait::async_trait;
use bytes::Bytes;
use std::io;
use thiserror::Error;

use crate::models::object::{ObjectInfo, StoredObject};

const MAX_OBJECT_KEY_LEN: usize = 1024;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid object key `{0}`")]
    InvalidKey(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Blob storage keyed by string paths.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read an object and its catalog entry. `Ok(None)` when absent.
    async fn get(&self, key: &str) -> StoreResult<Option<StoredObject>>;

    /// Read only the catalog entry. `Ok(None)` when absent.
    async fn head(&self, key: &str) -> StoreResult<Option<ObjectInfo>>;

    /// Write `body` under `key`, replacing any previous object.
    async fn put(&self, key: &str, body: Bytes, content_type: Option<&str>)
    -> StoreResult<ObjectInfo>;

    /// Remove `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Readiness probe for the backend.
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Reject keys that are empty, oversized, absolute, or could escape the
/// storage root once mapped onto a filesystem path.
pub fn ensure_key_safe(key: &str) -> StoreResult<()> {
    let invalid = key.is_empty()
        || key.len() > MAX_OBJECT_KEY_LEN
        || key.starts_with('/')
        || key.contains("..")
        || key
            .bytes()
            .any(|b| b.is_ascii_control() || b == b'\\' || b == b'\0');
    if invalid {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Hex MD5 of a payload, used as the object's etag.
pub fn compute_etag(body: &[u8]) -> String {
    format!("{:x}", md5::compute(body))
}
