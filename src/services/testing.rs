//! Test doubles for exercising failure paths of the repositories.

use async_trait::async_trait;
use bytes::Bytes;
use std::{collections::HashSet, io, sync::Mutex};

use super::{
    memory_store::MemoryObjectStore,
    object_store::{ObjectStore, StoreError, StoreResult},
};
use crate::models::object::{ObjectInfo, StoredObject};

/// Wraps a [`MemoryObjectStore`], records every mutation in order and fails
/// writes to selected keys.
#[derive(Default)]
pub struct RecordingStore {
    pub inner: MemoryObjectStore,
    failing_puts: Mutex<HashSet<String>>,
    log: Mutex<Vec<String>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_puts_to(&self, key: &str) {
        self.failing_puts.lock().unwrap().insert(key.to_string());
    }

    pub fn heal(&self) {
        self.failing_puts.lock().unwrap().clear();
    }

    /// Mutations so far, as `"put <key>"` / `"delete <key>"`.
    pub fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn clear_log(&self) {
        self.log.lock().unwrap().clear();
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn get(&self, key: &str) -> StoreResult<Option<StoredObject>> {
        self.inner.get(key).await
    }

    async fn head(&self, key: &str) -> StoreResult<Option<ObjectInfo>> {
        self.inner.head(key).await
    }

    async fn put(
        &self,
        key: &str,
        body: Bytes,
        content_type: Option<&str>,
    ) -> StoreResult<ObjectInfo> {
        if self.failing_puts.lock().unwrap().contains(key) {
            return Err(StoreError::Io(io::Error::other(format!("injected failure for {key}"))));
        }
        self.log.lock().unwrap().push(format!("put {key}"));
        self.inner.put(key, body, content_type).await
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.log.lock().unwrap().push(format!("delete {key}"));
        self.inner.delete(key).await
    }
}
