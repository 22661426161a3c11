use mseal_types::RecordId;

/// Errors produced by ledger operations.
///
/// A missing record is *not* an error at this boundary (`read` returns
/// `Ok(None)`) because "never registered" is a valid outcome the caller
/// must distinguish from ledger failure.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// An entry already exists for this record id. Entries are write-once.
    #[error("record {0} is already registered")]
    DuplicateRecord(RecordId),

    /// The ledger backend is unreachable or refused the operation.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    /// A stored entry failed its integrity check.
    #[error("corrupt ledger entry at seq {seq}: {reason}")]
    CorruptEntry { seq: u64, reason: String },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the backing storage.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
