use mseal_types::RecordId;

/// Errors from content repository operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A blob already exists for this id. Re-registration must use a new id.
    #[error("blob already exists for record {0}")]
    AlreadyExists(RecordId),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend rejected or could not complete the operation.
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
