//! In-memory, HashMap-based object store.
//!
//! Used by tests and by `--ephemeral` runs. Same semantics as the disk
//! backend, including key validation.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use std::{collections::HashMap, sync::RwLock};

use super::object_store::{ObjectStore, StoreResult, compute_etag, ensure_key_safe};
use crate::models::object::{ObjectInfo, StoredObject};

#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get(&self, key: &str) -> StoreResult<Option<StoredObject>> {
        ensure_key_safe(key)?;
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.get(key).cloned())
    }

    async fn head(&self, key: &str) -> StoreResult<Option<ObjectInfo>> {
        ensure_key_safe(key)?;
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.get(key).map(|obj| obj.info.clone()))
    }

    async fn put(
        &self,
        key: &str,
        body: Bytes,
        content_type: Option<&str>,
    ) -> StoreResult<ObjectInfo> {
        ensure_key_safe(key)?;
        let info = ObjectInfo {
            key: key.to_string(),
            content_type: content_type.map(str::to_string),
            size_bytes: body.len() as i64,
            etag: compute_etag(&body),
            last_modified: Utc::now(),
        };
        let mut map = self.objects.write().expect("lock poisoned");
        map.insert(
            key.to_string(),
            StoredObject {
                info: info.clone(),
                body,
            },
        );
        Ok(info)
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        ensure_key_safe(key)?;
        self.objects.write().expect("lock poisoned").remove(key);
        Ok(())
    }
}
