//! Metadata Store: owner of the two index objects.
//!
//! Each index (`metadata`, `attachment-list`) is only ever changed by reading
//! the whole object, modifying it in memory and writing the whole object
//! back. Every write-back is preceded by copying the pre-mutation value to
//! the `-bak` key:
//!
//! 1. put `{index}-bak` ← previous value
//! 2. put `{index}`     ← new value
//!
//! The two puts are independent. If step 1 fails, step 2 never runs and the
//! visible index is untouched. If step 2 fails, the backup already holds the
//! previous generation. Only one backup generation exists, so a second
//! consecutive failed update leaves no older recovery point.
//!
//! There is no compare-and-swap: two concurrent read-modify-write cycles on
//! the same index race and the later write wins (lost update). Deployments
//! are assumed to have a single admin writer. All call sites go through
//! [`IndexStore::update`] / [`IndexStore::write_with_backup`], which is where
//! a conditional write keyed on the object's etag would slot in.

use bytes::Bytes;
use serde::{Serialize, de::DeserializeOwned};
use std::{marker::PhantomData, sync::Arc};
use tracing::debug;

use super::{
    content_error::{ContentError, ContentResult},
    keyspace::{Generation, IndexKind, Keyspace},
    object_store::ObjectStore,
};
use crate::models::{attachment::AttachmentList, site::Metadata};

pub(crate) const JSON_CONTENT_TYPE: &str = "application/json";

/// One index object and its single backup generation.
pub struct IndexStore<T> {
    store: Arc<dyn ObjectStore>,
    kind: IndexKind,
    current_key: String,
    backup_key: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for IndexStore<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            kind: self.kind,
            current_key: self.current_key.clone(),
            backup_key: self.backup_key.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> IndexStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    pub fn new(store: Arc<dyn ObjectStore>, keys: &Keyspace, kind: IndexKind) -> Self {
        Self {
            store,
            kind,
            current_key: keys.index(kind, Generation::Current),
            backup_key: keys.index(kind, Generation::Backup),
            _marker: PhantomData,
        }
    }

    pub fn kind(&self) -> IndexKind {
        self.kind
    }

    fn key(&self, generation: Generation) -> &str {
        match generation {
            Generation::Current => &self.current_key,
            Generation::Backup => &self.backup_key,
        }
    }

    /// Read one generation. `Ok(None)` when that key is absent.
    pub async fn read_generation(&self, generation: Generation) -> ContentResult<Option<T>> {
        let key = self.key(generation);
        let Some(object) = self.store.get(key).await? else {
            return Ok(None);
        };
        let value = serde_json::from_slice(&object.body).map_err(|source| {
            ContentError::Corrupt {
                key: key.to_string(),
                source,
            }
        })?;
        Ok(Some(value))
    }

    /// Read the current index. A missing index is never repaired here; it
    /// surfaces as [`ContentError::IndexMissing`].
    pub async fn read(&self) -> ContentResult<T> {
        self.read_generation(Generation::Current)
            .await?
            .ok_or_else(|| ContentError::IndexMissing(self.current_key.clone()))
    }

    async fn put_generation(&self, generation: Generation, value: &T) -> ContentResult<()> {
        let key = self.key(generation);
        let body = serde_json::to_vec(value).map_err(|source| ContentError::Corrupt {
            key: key.to_string(),
            source,
        })?;
        self.store
            .put(key, Bytes::from(body), Some(JSON_CONTENT_TYPE))
            .await?;
        Ok(())
    }

    /// Persist `next`, first saving `previous` as the backup generation.
    pub async fn write_with_backup(&self, previous: &T, next: &T) -> ContentResult<()> {
        self.put_generation(Generation::Backup, previous).await?;
        self.put_generation(Generation::Current, next).await?;
        debug!("wrote {} with backup", self.current_key);
        Ok(())
    }

    /// Read-modify-write with backup. Returns whatever `mutate` returns.
    pub async fn update<F, R>(&self, mutate: F) -> ContentResult<R>
    where
        F: FnOnce(&mut T) -> R + Send,
        R: Send,
        T: Clone,
    {
        let previous = self.read().await?;
        let mut next = previous.clone();
        let out = mutate(&mut next);
        self.write_with_backup(&previous, &next).await?;
        Ok(out)
    }

    /// Replace the current generation without touching the backup.
    pub async fn overwrite(&self, value: &T) -> ContentResult<()> {
        self.put_generation(Generation::Current, value).await
    }

    /// Copy the backup generation over the current one.
    pub async fn restore_backup(&self) -> ContentResult<T> {
        let backup = self
            .read_generation(Generation::Backup)
            .await?
            .ok_or_else(|| ContentError::BackupMissing(self.backup_key.clone()))?;
        self.put_generation(Generation::Current, &backup).await?;
        Ok(backup)
    }
}

/// Both index objects of a deployment.
#[derive(Clone)]
pub struct MetadataStore {
    pub metadata: IndexStore<Metadata>,
    pub attachments: IndexStore<AttachmentList>,
}

impl MetadataStore {
    pub fn new(store: Arc<dyn ObjectStore>, keys: &Keyspace) -> Self {
        Self {
            metadata: IndexStore::new(store.clone(), keys, IndexKind::Metadata),
            attachments: IndexStore::new(store, keys, IndexKind::AttachmentList),
        }
    }
}
