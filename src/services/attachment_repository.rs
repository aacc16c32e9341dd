//! Attachment Repository: raw attachment blobs and their entries in the
//! attachment-list index.
//!
//! As with articles, the blob is written or deleted first and the index is
//! rewritten (with backup) afterwards, with no rollback between the steps.

use bytes::Bytes;
use std::sync::Arc;
use tracing::info;

use super::{
    content_error::{ContentError, ContentResult},
    keyspace::Keyspace,
    metadata_store::MetadataStore,
    object_store::ObjectStore,
};
use crate::models::attachment::Attachment;

#[derive(Clone)]
pub struct AttachmentRepository {
    store: Arc<dyn ObjectStore>,
    keys: Keyspace,
    index: MetadataStore,
}

impl AttachmentRepository {
    pub fn new(store: Arc<dyn ObjectStore>, keys: Keyspace, index: MetadataStore) -> Self {
        Self { store, keys, index }
    }

    /// 1. put `attachments/{filename}` (no existence check; overwrites)
    /// 2. append a record to the attachment list (with backup)
    ///
    /// Re-uploading a filename appends a second entry for it.
    pub async fn upload(
        &self,
        filename: Option<&str>,
        body: Bytes,
        article_uuid: Option<String>,
        content_type: Option<&str>,
    ) -> ContentResult<Attachment> {
        let filename = match filename {
            Some(name) if !name.is_empty() => name,
            _ => return Err(ContentError::BadRequest("filename is required".into())),
        };
        if body.is_empty() {
            return Err(ContentError::BadRequest("attachment body is empty".into()));
        }

        let record = Attachment::uploaded_now(
            filename,
            article_uuid.filter(|uuid| !uuid.is_empty()),
            body.len() as u64,
        );
        self.store
            .put(&self.keys.attachment(filename), body, content_type)
            .await?;

        let entry = record.clone();
        self.index
            .attachments
            .update(move |list| list.push(entry))
            .await?;

        info!(filename = %record.filename, size = record.size, "attachment uploaded");
        Ok(record)
    }

    /// 1. delete `attachments/{filename}` (absent blob is fine)
    /// 2. drop every entry with that filename from the list (with backup)
    pub async fn delete(&self, filename: &str) -> ContentResult<()> {
        if filename.is_empty() {
            return Err(ContentError::BadRequest("filename is required".into()));
        }
        self.store.delete(&self.keys.attachment(filename)).await?;
        self.index
            .attachments
            .update(|list| list.retain(|entry| entry.filename != filename))
            .await?;

        info!(filename = %filename, "attachment deleted");
        Ok(())
    }

    /// Point the list entry for `filename` at another article. The blob is
    /// not checked, and an unknown filename leaves the list unchanged (the
    /// index is still rewritten with a backup).
    pub async fn relink(&self, filename: &str, article_uuid: &str) -> ContentResult<()> {
        if filename.is_empty() || article_uuid.is_empty() {
            return Err(ContentError::BadRequest(
                "filename and article_uuid are required".into(),
            ));
        }
        let matched = self
            .index
            .attachments
            .update(|list| {
                let mut matched = 0usize;
                for entry in list.iter_mut().filter(|entry| entry.filename == filename) {
                    entry.article_uuid = article_uuid.to_string();
                    matched += 1;
                }
                matched
            })
            .await?;

        info!(filename = %filename, article_uuid = %article_uuid, matched, "attachment relinked");
        Ok(())
    }
}
