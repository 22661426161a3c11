use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use mseal_crypto::ContentHasher;
use mseal_ledger::{Ledger, TransactionRef};
use mseal_store::{ContentStore, StoredLocation};
use mseal_types::{ContentDigest, MediaType, RecordId};

use crate::error::{PartialCause, RegisterError, Stage};

/// Run a collaborator call under the service's optional timeout.
///
/// `None` means the deadline expired before the call finished.
pub(crate) async fn bounded<F, T>(limit: Option<Duration>, fut: F) -> Option<T>
where
    F: Future<Output = T>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut).await.ok(),
        None => Some(fut.await),
    }
}

/// Full-success result of a registration.
#[derive(Clone, Debug, Serialize)]
pub struct Registration {
    pub id: RecordId,
    pub digest: ContentDigest,
    pub location: StoredLocation,
    pub transaction: TransactionRef,
}

/// Orchestrates the two-phase register sequence.
///
/// `generate id → hash → store put → ledger write`, strictly in that order:
/// the store put gates the ledger write so a failed put can never leave an
/// orphan ledger entry with no retrievable content. The operation is not
/// idempotent — registering the same bytes twice produces two independent
/// records, because an id names an instance of registration, not the
/// content.
pub struct RegistrationService {
    store: Arc<dyn ContentStore>,
    ledger: Arc<dyn Ledger>,
    media_type: MediaType,
    op_timeout: Option<Duration>,
}

impl RegistrationService {
    /// Build a service over injected collaborators. Registrations are tagged
    /// `video/mp4` and network calls are unbounded unless configured
    /// otherwise.
    pub fn new(store: Arc<dyn ContentStore>, ledger: Arc<dyn Ledger>) -> Self {
        Self {
            store,
            ledger,
            media_type: MediaType::mp4(),
            op_timeout: None,
        }
    }

    /// Tag stored blobs with a different media type.
    pub fn with_media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = media_type;
        self
    }

    /// Bound each collaborator call (store put, ledger write) to `limit`.
    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.op_timeout = Some(limit);
        self
    }

    /// Register a file's bytes: store a copy and seal its digest in the
    /// ledger under a fresh record id. Blobs are tagged with the service's
    /// default media type.
    pub async fn register(&self, data: &[u8]) -> Result<Registration, RegisterError> {
        self.register_as(data, &self.media_type).await
    }

    /// Register with an explicit media type, overriding the service default.
    pub async fn register_as(
        &self,
        data: &[u8],
        media_type: &MediaType,
    ) -> Result<Registration, RegisterError> {
        if data.is_empty() {
            return Err(RegisterError::EmptyInput);
        }

        let id = RecordId::generate();
        let digest = ContentHasher::digest(data);

        let location = match bounded(self.op_timeout, self.store.put(&id, data, media_type))
            .await
        {
            None => {
                return Err(RegisterError::Timeout {
                    stage: Stage::StorePut,
                    elapsed: self.op_timeout.unwrap_or_default(),
                })
            }
            Some(result) => result?,
        };

        let ledger_write = bounded(self.op_timeout, self.ledger.register(&id, &digest)).await;
        let transaction = match ledger_write {
            None => {
                warn!(record = %id, "ledger write timed out after store put; partial registration");
                return Err(RegisterError::Partial {
                    id,
                    digest,
                    cause: PartialCause::Timeout(self.op_timeout.unwrap_or_default()),
                });
            }
            Some(Err(cause)) => {
                warn!(record = %id, error = %cause, "ledger write failed after store put; partial registration");
                return Err(RegisterError::Partial {
                    id,
                    digest,
                    cause: PartialCause::Ledger(cause),
                });
            }
            Some(Ok(transaction)) => transaction,
        };

        info!(
            record = %id,
            digest = %digest.short_hex(),
            tx = %transaction.short_hex(),
            bytes = data.len(),
            "record registered"
        );
        Ok(Registration {
            id,
            digest,
            location,
            transaction,
        })
    }
}
