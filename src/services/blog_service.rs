//! BlogService wires the repositories over one object store and one
//! keyspace, and owns the few operations that belong to no repository:
//! site settings, the avatar and raw public reads.

use bytes::Bytes;
use std::sync::Arc;
use tracing::info;

use super::{
    article_repository::ArticleRepository,
    attachment_repository::AttachmentRepository,
    content_error::{ContentError, ContentResult},
    keyspace::Keyspace,
    metadata_store::MetadataStore,
    object_store::{ObjectStore, StoreResult},
    recovery::{self, RecoveryReport},
};
use crate::models::{object::StoredObject, site::Site};

const PNG_CONTENT_TYPE: &str = "image/png";

#[derive(Clone)]
pub struct BlogService {
    store: Arc<dyn ObjectStore>,
    keys: Keyspace,
    pub index: MetadataStore,
    pub articles: ArticleRepository,
    pub attachments: AttachmentRepository,
}

impl BlogService {
    pub fn new(store: Arc<dyn ObjectStore>, keys: Keyspace) -> Self {
        let index = MetadataStore::new(store.clone(), &keys);
        Self {
            articles: ArticleRepository::new(store.clone(), keys.clone(), index.clone()),
            attachments: AttachmentRepository::new(store.clone(), keys.clone(), index.clone()),
            index,
            store,
            keys,
        }
    }

    /// Replace the site settings inside the metadata index (with backup).
    pub async fn update_site(&self, site: Site) -> ContentResult<()> {
        self.index
            .metadata
            .update(move |metadata| metadata.site = site)
            .await?;
        info!("site settings updated");
        Ok(())
    }

    /// Overwrite `avatar.png`.
    pub async fn put_avatar(&self, body: Bytes) -> ContentResult<()> {
        if body.is_empty() {
            return Err(ContentError::BadRequest("avatar body is empty".into()));
        }
        let size = body.len();
        self.store
            .put(&self.keys.avatar(), body, Some(PNG_CONTENT_TYPE))
            .await?;
        info!(size, "avatar replaced");
        Ok(())
    }

    /// Read any object by its path relative to the base directory.
    pub async fn read_file(&self, path: &str) -> ContentResult<StoredObject> {
        if path.is_empty() {
            return Err(ContentError::BadRequest("path is required".into()));
        }
        let key = self.keys.resolve(path);
        self.store
            .get(&key)
            .await?
            .ok_or(ContentError::ObjectNotFound(path.to_string()))
    }

    pub async fn initialize(&self) -> ContentResult<()> {
        recovery::initialize(&self.index).await
    }

    pub async fn recover(&self) -> ContentResult<RecoveryReport> {
        recovery::recover(&self.index).await
    }

    pub async fn ping(&self) -> StoreResult<()> {
        self.store.ping().await
    }
}
