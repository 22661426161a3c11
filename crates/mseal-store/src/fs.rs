use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use mseal_types::{MediaType, RecordId};

use crate::error::{StoreError, StoreResult};
use crate::traits::{ContentStore, StoredLocation};

/// Filesystem-backed content store.
///
/// Each blob is a single `<id>.<ext>` file under the root directory, where
/// the extension comes from the blob's media type. The root directory is
/// created on open if missing (idempotent setup); everything else is plain
/// file I/O with errors propagated.
pub struct FsContentStore {
    root: PathBuf,
}

impl FsContentStore {
    /// Open a store rooted at the given directory, creating it if needed.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The root directory blobs live under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Remove the blob for an id, returning `true` if one existed.
    ///
    /// Not part of [`ContentStore`]: the core never deletes, this exists for
    /// operator tooling.
    pub async fn remove(&self, id: &RecordId) -> StoreResult<bool> {
        match self.find_path(id).await? {
            Some(path) => {
                tokio::fs::remove_file(path).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Locate the blob file for an id, whatever its extension.
    async fn find_path(&self, id: &RecordId) -> StoreResult<Option<PathBuf>> {
        let stem = id.to_string();
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.file_stem().and_then(|s| s.to_str()) == Some(stem.as_str()) {
                return Ok(Some(path));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl ContentStore for FsContentStore {
    async fn put(
        &self,
        id: &RecordId,
        data: &[u8],
        media_type: &MediaType,
    ) -> StoreResult<StoredLocation> {
        if self.find_path(id).await?.is_some() {
            return Err(StoreError::AlreadyExists(*id));
        }
        let path = self.root.join(format!("{id}.{}", media_type.extension()));
        tokio::fs::write(&path, data).await?;
        debug!(record = %id, bytes = data.len(), path = %path.display(), "blob written");
        Ok(StoredLocation::new(path.display().to_string()))
    }

    async fn get(&self, id: &RecordId) -> StoreResult<Option<Vec<u8>>> {
        match self.find_path(id).await? {
            Some(path) => Ok(Some(tokio::fs::read(path).await?)),
            None => Ok(None),
        }
    }

    async fn exists(&self, id: &RecordId) -> StoreResult<bool> {
        Ok(self.find_path(id).await?.is_some())
    }
}

impl std::fmt::Debug for FsContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsContentStore")
            .field("root", &self.root)
            .finish()
    }
}
