use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::info;

use mseal_crypto::ContentHasher;
use mseal_ledger::Ledger;
use mseal_store::ContentStore;
use mseal_types::{ContentDigest, RecordId};

use crate::error::{Stage, VerifyError};
use crate::register::bounded;

/// Outcome of a successful verification call.
///
/// `valid: false` is a positive tamper signal, not a soft warning — the
/// content demonstrably differs from what was sealed at registration time.
/// Nothing here is persisted; every call recomputes from current content
/// and ledger state.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Verification {
    pub id: RecordId,
    pub valid: bool,
    pub current_digest: ContentDigest,
    pub stored_digest: ContentDigest,
    /// Unix seconds at which the record was sealed.
    pub registered_at: u64,
}

impl Verification {
    /// The inverse reading of `valid`.
    pub fn tampered(&self) -> bool {
        !self.valid
    }
}

/// Orchestrates the verify sequence.
///
/// Remote shape: fetch the previously stored copy, rehash, compare against
/// the ledger. Local shape: the caller supplies the bytes (a file already on
/// disk) and the store is not consulted. In both shapes the ledger read
/// happens only after bytes are in hand, so "content missing" and "record
/// missing" stay distinct outcomes.
pub struct VerificationService {
    store: Arc<dyn ContentStore>,
    ledger: Arc<dyn Ledger>,
    op_timeout: Option<Duration>,
}

impl VerificationService {
    /// Build a service over injected collaborators. Network calls are
    /// unbounded unless configured otherwise.
    pub fn new(store: Arc<dyn ContentStore>, ledger: Arc<dyn Ledger>) -> Self {
        Self {
            store,
            ledger,
            op_timeout: None,
        }
    }

    /// Bound each collaborator call (store get, ledger read) to `limit`.
    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.op_timeout = Some(limit);
        self
    }

    /// Remote verification: fetch the stored copy of `id` and check it
    /// against the ledger.
    pub async fn verify(&self, id: &RecordId) -> Result<Verification, VerifyError> {
        let fetched = match bounded(self.op_timeout, self.store.get(id)).await {
            None => {
                return Err(VerifyError::Timeout {
                    stage: Stage::StoreGet,
                    elapsed: self.op_timeout.unwrap_or_default(),
                })
            }
            Some(result) => result?,
        };
        // Absence of content is reported before any ledger lookup.
        let bytes = fetched.ok_or(VerifyError::ContentNotFound(*id))?;
        self.compare(id, &bytes).await
    }

    /// Local verification: check caller-supplied bytes against the ledger
    /// entry for `id`. The store is not consulted.
    pub async fn verify_local(
        &self,
        id: &RecordId,
        data: &[u8],
    ) -> Result<Verification, VerifyError> {
        if data.is_empty() {
            return Err(VerifyError::EmptyInput);
        }
        self.compare(id, data).await
    }

    async fn compare(&self, id: &RecordId, data: &[u8]) -> Result<Verification, VerifyError> {
        let current_digest = ContentHasher::digest(data);

        let entry = match bounded(self.op_timeout, self.ledger.read(id)).await {
            None => {
                return Err(VerifyError::Timeout {
                    stage: Stage::LedgerRead,
                    elapsed: self.op_timeout.unwrap_or_default(),
                })
            }
            Some(result) => result?,
        };
        let entry = entry.ok_or(VerifyError::RecordNotFound(*id))?;

        // Exact digest equality; the hex forms were case-normalized at parse.
        let valid = current_digest == entry.digest;
        info!(
            record = %id,
            valid,
            current = %current_digest.short_hex(),
            stored = %entry.digest.short_hex(),
            "record verified"
        );
        Ok(Verification {
            id: *id,
            valid,
            current_digest,
            stored_digest: entry.digest,
            registered_at: entry.registered_at,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_doubles {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use mseal_ledger::{Ledger, LedgerEntry, LedgerError, LedgerResult, TransactionRef};
    use mseal_store::{ContentStore, StoreError, StoreResult, StoredLocation};
    use mseal_types::{ContentDigest, MediaType, RecordId};

    /// Store whose `put` always fails.
    pub struct RejectingStore;

    #[async_trait]
    impl ContentStore for RejectingStore {
        async fn put(
            &self,
            _id: &RecordId,
            _data: &[u8],
            _media_type: &MediaType,
        ) -> StoreResult<StoredLocation> {
            Err(StoreError::Backend("bucket rejected the upload".into()))
        }

        async fn get(&self, _id: &RecordId) -> StoreResult<Option<Vec<u8>>> {
            Err(StoreError::Backend("bucket unreachable".into()))
        }
    }

    /// Ledger whose writes fail but whose reads report "never registered".
    #[derive(Default)]
    pub struct FlakyLedger;

    #[async_trait]
    impl Ledger for FlakyLedger {
        async fn register(
            &self,
            _id: &RecordId,
            _digest: &ContentDigest,
        ) -> LedgerResult<TransactionRef> {
            Err(LedgerError::Unavailable("rpc endpoint down".into()))
        }

        async fn read(&self, _id: &RecordId) -> LedgerResult<Option<LedgerEntry>> {
            Ok(None)
        }
    }

    /// Ledger that never completes any call.
    pub struct HangingLedger;

    #[async_trait]
    impl Ledger for HangingLedger {
        async fn register(
            &self,
            _id: &RecordId,
            _digest: &ContentDigest,
        ) -> LedgerResult<TransactionRef> {
            std::future::pending().await
        }

        async fn read(&self, _id: &RecordId) -> LedgerResult<Option<LedgerEntry>> {
            std::future::pending().await
        }
    }

    /// Ledger wrapper that counts reads, for asserting call ordering.
    pub struct ProbeLedger<L> {
        pub inner: L,
        pub reads: AtomicUsize,
    }

    impl<L> ProbeLedger<L> {
        pub fn new(inner: L) -> Self {
            Self {
                inner,
                reads: AtomicUsize::new(0),
            }
        }

        pub fn read_count(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl<L: Ledger> Ledger for ProbeLedger<L> {
        async fn register(
            &self,
            id: &RecordId,
            digest: &ContentDigest,
        ) -> LedgerResult<TransactionRef> {
            self.inner.register(id, digest).await
        }

        async fn read(&self, id: &RecordId) -> LedgerResult<Option<LedgerEntry>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.read(id).await
        }
    }
}
