//! Attachment records kept in the attachment-list index.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// One entry of the attachment-list index. The blob itself lives at
/// `attachments/{filename}`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Attachment {
    /// Unique key of the blob.
    pub filename: String,

    /// Article this attachment belongs to; empty when unlinked.
    #[serde(default)]
    pub article_uuid: String,

    /// Payload length in bytes.
    pub size: u64,

    /// Upload time in epoch seconds.
    pub uploaded_time: f64,
}

/// The attachment-list index object.
pub type AttachmentList = Vec<Attachment>;

impl Attachment {
    /// Build a record for a payload uploaded now.
    pub fn uploaded_now(filename: impl Into<String>, article_uuid: Option<String>, size: u64) -> Self {
        Self {
            filename: filename.into(),
            article_uuid: article_uuid.unwrap_or_default(),
            size,
            uploaded_time: epoch_seconds_now(),
        }
    }
}

/// Current time as fractional epoch seconds, millisecond precision.
pub fn epoch_seconds_now() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}
