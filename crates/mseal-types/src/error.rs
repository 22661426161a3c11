/// Errors from parsing or constructing foundation types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    #[error("invalid hex encoding: {0}")]
    InvalidHex(String),

    #[error("invalid digest length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid record id: {0}")]
    InvalidRecordId(String),

    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),
}
