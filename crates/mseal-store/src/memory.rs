use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use mseal_types::{MediaType, RecordId};

use crate::error::{StoreError, StoreResult};
use crate::traits::{ContentStore, StoredLocation};

#[derive(Clone)]
struct StoredBlob {
    data: Vec<u8>,
    media_type: MediaType,
}

/// In-memory, `HashMap`-based content store.
///
/// Intended for tests and embedding. All blobs are held in memory behind a
/// `RwLock` for safe concurrent access.
pub struct InMemoryContentStore {
    blobs: RwLock<HashMap<RecordId, StoredBlob>>,
}

impl InMemoryContentStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
        }
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> usize {
        self.blobs.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store holds no blobs.
    pub fn is_empty(&self) -> bool {
        self.blobs.read().expect("lock poisoned").is_empty()
    }

    /// Total bytes across all stored blobs.
    pub fn total_bytes(&self) -> u64 {
        self.blobs
            .read()
            .expect("lock poisoned")
            .values()
            .map(|blob| blob.data.len() as u64)
            .sum()
    }

    /// Remove the blob for an id, returning `true` if one existed.
    ///
    /// Not part of [`ContentStore`]: the core never deletes, this exists for
    /// operator tooling and for simulating out-of-band modification.
    pub fn remove(&self, id: &RecordId) -> bool {
        self.blobs
            .write()
            .expect("lock poisoned")
            .remove(id)
            .is_some()
    }

    /// The media type recorded for a stored blob, if present.
    pub fn media_type_of(&self, id: &RecordId) -> Option<MediaType> {
        self.blobs
            .read()
            .expect("lock poisoned")
            .get(id)
            .map(|blob| blob.media_type.clone())
    }
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn put(
        &self,
        id: &RecordId,
        data: &[u8],
        media_type: &MediaType,
    ) -> StoreResult<StoredLocation> {
        let mut map = self.blobs.write().expect("lock poisoned");
        if map.contains_key(id) {
            return Err(StoreError::AlreadyExists(*id));
        }
        map.insert(
            *id,
            StoredBlob {
                data: data.to_vec(),
                media_type: media_type.clone(),
            },
        );
        Ok(StoredLocation::new(format!(
            "mem:{id}.{}",
            media_type.extension()
        )))
    }

    async fn get(&self, id: &RecordId) -> StoreResult<Option<Vec<u8>>> {
        let map = self.blobs.read().expect("lock poisoned");
        Ok(map.get(id).map(|blob| blob.data.clone()))
    }

    async fn exists(&self, id: &RecordId) -> StoreResult<bool> {
        let map = self.blobs.read().expect("lock poisoned");
        Ok(map.contains_key(id))
    }
}

impl std::fmt::Debug for InMemoryContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryContentStore")
            .field("blob_count", &self.len())
            .finish()
    }
}
