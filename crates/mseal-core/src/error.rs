use std::fmt;
use std::time::Duration;

use mseal_ledger::LedgerError;
use mseal_store::StoreError;
use mseal_types::{ContentDigest, RecordId};

/// Pipeline stage at which a bounded network call timed out.
///
/// A ledger-write timeout is not listed here: after the store put has
/// succeeded it is reported as a partial registration, not a plain timeout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    StorePut,
    StoreGet,
    LedgerRead,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StorePut => "content store put",
            Self::StoreGet => "content store get",
            Self::LedgerRead => "ledger read",
        };
        write!(f, "{name}")
    }
}

/// Why a registration was left half-done: the ledger write (or its timeout)
/// after the store put had already succeeded.
#[derive(Debug, thiserror::Error)]
pub enum PartialCause {
    #[error("{0}")]
    Ledger(#[from] LedgerError),

    #[error("ledger register timed out after {0:?} (outcome unknown)")]
    Timeout(Duration),
}

/// Errors from the register operation.
#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    /// Zero-byte input; nothing to register. Fails before any network call.
    #[error("no content supplied")]
    EmptyInput,

    /// The store put failed. The ledger was never touched, so there is
    /// nothing to reconcile.
    #[error("content store failure: {0}")]
    Store(#[from] StoreError),

    /// The store put timed out. The ledger was never touched.
    #[error("{stage} timed out after {elapsed:?}")]
    Timeout { stage: Stage, elapsed: Duration },

    /// Store put succeeded but the ledger write did not: record `id` now has
    /// stored content with no ledger entry. Reported for manual
    /// reconciliation; the blob is deliberately not deleted.
    #[error(
        "partial registration of record {id}: content is stored but the ledger write failed ({cause})"
    )]
    Partial {
        id: RecordId,
        digest: ContentDigest,
        #[source]
        cause: PartialCause,
    },
}

/// Errors from the verify operation. A digest mismatch is *not* among them.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// Zero-byte local input; nothing to verify. Fails before any network call.
    #[error("no content supplied")]
    EmptyInput,

    /// No stored blob for this id. Reported before any ledger lookup,
    /// distinctly from a missing ledger entry.
    #[error("no stored content for record {0}")]
    ContentNotFound(RecordId),

    /// No ledger entry for this id: it was never registered. Distinct from a
    /// tamper verdict.
    #[error("record {0} not found in ledger")]
    RecordNotFound(RecordId),

    /// The store failed while fetching content.
    #[error("content store failure: {0}")]
    Store(#[from] StoreError),

    /// The ledger failed while reading the entry.
    #[error("ledger failure: {0}")]
    Ledger(#[from] LedgerError),

    /// A bounded network call timed out.
    #[error("{stage} timed out after {elapsed:?}")]
    Timeout { stage: Stage, elapsed: Duration },
}
