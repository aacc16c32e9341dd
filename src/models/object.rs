//! Represents a blob held by the object store.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Catalog entry describing a stored blob.
///
/// `ObjectInfo` carries the metadata only, not the payload bytes. It is what a
/// `head` probe returns.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq)]
pub struct ObjectInfo {
    /// Full key, including the deployment's base directory.
    pub key: String,

    /// Content type (MIME type) recorded at write time.
    pub content_type: Option<String>,

    /// Size in bytes.
    pub size_bytes: i64,

    /// Hex MD5 of the payload.
    pub etag: String,

    /// Timestamp when the object was last written.
    pub last_modified: DateTime<Utc>,
}

/// A blob together with its catalog entry.
#[derive(Clone, Debug)]
pub struct StoredObject {
    pub info: ObjectInfo,
    pub body: Bytes,
}

impl StoredObject {
    /// Content type to serve this object with.
    pub fn content_type(&self) -> &str {
        self.info
            .content_type
            .as_deref()
            .unwrap_or("application/octet-stream")
    }
}
