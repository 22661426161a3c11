use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use mseal_types::{MediaType, RecordId};

use crate::error::StoreResult;

/// Where a backend persisted a blob. Opaque to callers; useful in results
/// and log lines.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredLocation(String);

impl StoredLocation {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoredLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Blob store keyed by record id.
///
/// All implementations must satisfy these invariants:
/// - At most one blob per id. `put` on an occupied id fails with
///   [`AlreadyExists`](crate::StoreError::AlreadyExists); it never replaces.
/// - `get` for a missing id is `Ok(None)`, not an error. Only backend
///   failures are errors.
/// - Implementations must be safe for concurrent use by multiple in-flight
///   operations.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Persist a blob under the given record id.
    async fn put(
        &self,
        id: &RecordId,
        data: &[u8],
        media_type: &MediaType,
    ) -> StoreResult<StoredLocation>;

    /// Fetch the blob stored under the given record id.
    ///
    /// Returns `Ok(None)` if no blob exists for the id.
    async fn get(&self, id: &RecordId) -> StoreResult<Option<Vec<u8>>>;

    /// Check whether a blob exists for the given record id.
    async fn exists(&self, id: &RecordId) -> StoreResult<bool> {
        Ok(self.get(id).await?.is_some())
    }
}
