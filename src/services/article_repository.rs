//! Article Repository: per-article objects plus their briefs in the
//! metadata index.
//!
//! Every mutating operation is a fixed sequence of independently failable
//! store operations. Article objects are written first and the metadata
//! index last; nothing is rolled back. When the index step fails after the
//! article objects changed, the index and the objects disagree until an
//! operator restores the backup or reconciles by hand.

use bytes::Bytes;
use std::sync::Arc;
use tracing::info;

use super::{
    content_error::{ContentError, ContentResult},
    keyspace::Keyspace,
    metadata_store::{JSON_CONTENT_TYPE, MetadataStore},
    object_store::ObjectStore,
};
use crate::models::article::{Article, ArticleSlot};

#[derive(Clone)]
pub struct ArticleRepository {
    store: Arc<dyn ObjectStore>,
    keys: Keyspace,
    index: MetadataStore,
}

impl ArticleRepository {
    pub fn new(store: Arc<dyn ObjectStore>, keys: Keyspace, index: MetadataStore) -> Self {
        Self { store, keys, index }
    }

    async fn put_article(&self, uuid: &str, slot: ArticleSlot, body: Bytes) -> ContentResult<()> {
        self.store
            .put(&self.keys.article(uuid, slot), body, Some(JSON_CONTENT_TYPE))
            .await?;
        Ok(())
    }

    /// Existence of `current` is the existence check for an article.
    pub async fn exists(&self, uuid: &str) -> ContentResult<bool> {
        let key = self.keys.article(uuid, ArticleSlot::Current);
        Ok(self.store.head(&key).await?.is_some())
    }

    /// Read one slot of an article. `Ok(None)` when that slot is empty.
    pub async fn read(&self, uuid: &str, slot: ArticleSlot) -> ContentResult<Option<Article>> {
        let key = self.keys.article(uuid, slot);
        let Some(object) = self.store.get(&key).await? else {
            return Ok(None);
        };
        serde_json::from_slice(&object.body)
            .map(Some)
            .map_err(|source| ContentError::Corrupt { key, source })
    }

    /// 1. head `current` (exists → `ArticleExists`)
    /// 2. put `current`
    /// 3. append the brief to the metadata index (with backup)
    pub async fn create(&self, article: &Article) -> ContentResult<()> {
        if self.exists(&article.uuid).await? {
            return Err(ContentError::ArticleExists(article.uuid.clone()));
        }

        let body = encode(article, &self.keys.article(&article.uuid, ArticleSlot::Current))?;
        self.put_article(&article.uuid, ArticleSlot::Current, body)
            .await?;

        let brief = article.brief();
        self.index
            .metadata
            .update(move |metadata| metadata.articles.push(brief))
            .await?;

        info!(uuid = %article.uuid, "article created");
        Ok(())
    }

    /// 1. get `current` (absent → `ArticleNotFound`)
    /// 2. put `backup` ← the previous `current`, byte for byte
    /// 3. delete `stage`; an update supersedes any draft
    /// 4. put `current`
    /// 5. replace the matching brief in the metadata index (with backup)
    pub async fn update(&self, article: &Article) -> ContentResult<()> {
        let current_key = self.keys.article(&article.uuid, ArticleSlot::Current);
        let previous = self
            .store
            .get(&current_key)
            .await?
            .ok_or_else(|| ContentError::ArticleNotFound(article.uuid.clone()))?;

        self.put_article(&article.uuid, ArticleSlot::Backup, previous.body)
            .await?;
        self.store
            .delete(&self.keys.article(&article.uuid, ArticleSlot::Stage))
            .await?;
        let body = encode(article, &current_key)?;
        self.put_article(&article.uuid, ArticleSlot::Current, body)
            .await?;

        let brief = article.brief();
        self.index
            .metadata
            .update(move |metadata| {
                for entry in metadata.articles.iter_mut() {
                    if entry.uuid == brief.uuid {
                        *entry = brief.clone();
                    }
                }
            })
            .await?;

        info!(uuid = %article.uuid, "article updated");
        Ok(())
    }

    /// 1. head `current` (absent → `ArticleNotFound`)
    /// 2. put `stage`
    ///
    /// `current` and the metadata index are left alone. Publishing a draft is
    /// an ordinary [`update`](Self::update) with the staged content.
    pub async fn stage(&self, article: &Article) -> ContentResult<()> {
        if !self.exists(&article.uuid).await? {
            return Err(ContentError::ArticleNotFound(article.uuid.clone()));
        }
        let body = encode(article, &self.keys.article(&article.uuid, ArticleSlot::Stage))?;
        self.put_article(&article.uuid, ArticleSlot::Stage, body)
            .await?;

        info!(uuid = %article.uuid, "article staged");
        Ok(())
    }

    /// 1. head `current` (absent → `ArticleNotFound`)
    /// 2. delete `stage`, then `backup`, then `current`
    /// 3. drop the brief from the metadata index (with backup)
    pub async fn delete(&self, uuid: &str) -> ContentResult<()> {
        if !self.exists(uuid).await? {
            return Err(ContentError::ArticleNotFound(uuid.to_string()));
        }

        for slot in [ArticleSlot::Stage, ArticleSlot::Backup, ArticleSlot::Current] {
            self.store.delete(&self.keys.article(uuid, slot)).await?;
        }

        self.index
            .metadata
            .update(|metadata| metadata.articles.retain(|brief| brief.uuid != uuid))
            .await?;

        info!(uuid = %uuid, "article deleted");
        Ok(())
    }
}

fn encode(article: &Article, key: &str) -> ContentResult<Bytes> {
    serde_json::to_vec(article)
        .map(Bytes::from)
        .map_err(|source| ContentError::Corrupt {
            key: key.to_string(),
            source,
        })
}
