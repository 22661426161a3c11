use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use mseal_core::{RegisterError, VerifyError};

/// Process-level server errors (startup, I/O). Request-level failures are
/// [`ApiError`].
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[from] mseal_store::StoreError),

    #[error("ledger error: {0}")]
    Ledger(#[from] mseal_ledger::LedgerError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// A request-level failure, shaped into a JSON error body.
///
/// Status mapping keeps the core's taxonomy visible on the wire: input
/// problems are 4xx, collaborator failures are 502, timeouts are 504. A
/// tamper verdict never passes through here — it is a successful response.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

impl From<RegisterError> for ApiError {
    fn from(err: RegisterError) -> Self {
        let status = match &err {
            RegisterError::EmptyInput => StatusCode::BAD_REQUEST,
            RegisterError::Store(_) | RegisterError::Partial { .. } => StatusCode::BAD_GATEWAY,
            RegisterError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        };
        Self::new(status, err.to_string())
    }
}

impl From<VerifyError> for ApiError {
    fn from(err: VerifyError) -> Self {
        let status = match &err {
            VerifyError::EmptyInput => StatusCode::BAD_REQUEST,
            VerifyError::ContentNotFound(_) | VerifyError::RecordNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            VerifyError::Store(_) | VerifyError::Ledger(_) => StatusCode::BAD_GATEWAY,
            VerifyError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        };
        Self::new(status, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mseal_types::RecordId;

    #[test]
    fn not_found_outcomes_map_to_404() {
        let id = RecordId::generate();
        assert_eq!(
            ApiError::from(VerifyError::RecordNotFound(id)).status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(VerifyError::ContentNotFound(id)).status,
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn empty_input_maps_to_400() {
        assert_eq!(
            ApiError::from(RegisterError::EmptyInput).status,
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn partial_registration_message_names_the_id() {
        let id = RecordId::generate();
        let err = RegisterError::Partial {
            id,
            digest: mseal_types::ContentDigest::from_hash([0; 32]),
            cause: mseal_core::PartialCause::Ledger(mseal_ledger::LedgerError::Unavailable(
                "down".into(),
            )),
        };
        let api = ApiError::from(err);
        assert_eq!(api.status, StatusCode::BAD_GATEWAY);
        assert!(api.message.contains(&id.to_string()));
    }
}
