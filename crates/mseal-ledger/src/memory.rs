use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

use mseal_types::{ContentDigest, RecordId};

use crate::entry::{LedgerEntry, SealedEntry, TransactionRef};
use crate::error::{LedgerError, LedgerResult};
use crate::traits::Ledger;

/// Unix seconds now. Ledger timestamps are second-granular by wire contract.
pub(crate) fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[derive(Default)]
struct LedgerState {
    entries: HashMap<RecordId, SealedEntry>,
    /// Seal of the most recent entry; all zeros at genesis.
    head: [u8; 32],
    seq: u64,
}

/// In-memory ledger for tests, local demos, and embedding.
///
/// Entries are hash-chained exactly like the file-backed ledger so the two
/// are interchangeable behind the [`Ledger`] trait.
pub struct InMemoryLedger {
    inner: RwLock<LedgerState>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(LedgerState::default()),
        }
    }

    /// Number of registered records.
    pub fn len(&self) -> usize {
        self.inner.read().expect("lock poisoned").entries.len()
    }

    /// Returns `true` if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.inner.read().expect("lock poisoned").entries.is_empty()
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn register(
        &self,
        id: &RecordId,
        digest: &ContentDigest,
    ) -> LedgerResult<TransactionRef> {
        let mut state = self.inner.write().expect("lock poisoned");
        if state.entries.contains_key(id) {
            return Err(LedgerError::DuplicateRecord(*id));
        }
        let sealed = SealedEntry {
            seq: state.seq + 1,
            prev: state.head,
            id: *id,
            digest: *digest,
            registered_at: now_secs(),
        };
        let seal = sealed.seal();
        state.seq = sealed.seq;
        state.head = *seal.as_bytes();
        state.entries.insert(*id, sealed);
        Ok(seal)
    }

    async fn read(&self, id: &RecordId) -> LedgerResult<Option<LedgerEntry>> {
        let state = self.inner.read().expect("lock poisoned");
        Ok(state.entries.get(id).map(SealedEntry::entry))
    }
}

impl std::fmt::Debug for InMemoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryLedger")
            .field("record_count", &self.len())
            .finish()
    }
}
