use async_trait::async_trait;

use mseal_types::{ContentDigest, RecordId};

use crate::entry::{LedgerEntry, TransactionRef};
use crate::error::LedgerResult;

/// Append-only record ledger.
///
/// Contract, for all implementations:
/// - `register` is a single atomic append. Once it returns a
///   [`TransactionRef`], `read(id)` returns the same digest for the lifetime
///   of the system. There is no partial-success state: a call either
///   eventually confirms or fails.
/// - A second `register` for the same id fails with
///   [`DuplicateRecord`](crate::LedgerError::DuplicateRecord).
/// - The timestamp in the entry is assigned here, at write time, never taken
///   from the caller.
/// - `register` may be slow (block-confirmation-style latency). Callers own
///   any timeout policy.
/// - Implementations must be safe for concurrent use by multiple in-flight
///   operations.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Append a `(digest, now)` entry under the given record id.
    async fn register(
        &self,
        id: &RecordId,
        digest: &ContentDigest,
    ) -> LedgerResult<TransactionRef>;

    /// Read the entry for a record id.
    ///
    /// Returns `Ok(None)` if the id was never registered — a valid outcome,
    /// distinct from ledger failure.
    async fn read(&self, id: &RecordId) -> LedgerResult<Option<LedgerEntry>>;
}
