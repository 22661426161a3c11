use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Json;
use bytes::Bytes;
use serde::Serialize;
use serde_json::json;

use mseal_core::Verification;
use mseal_types::{MediaType, RecordId};

use crate::error::ApiError;
use crate::router::AppState;

#[derive(Serialize)]
pub struct RegisterResponse {
    pub id: RecordId,
    pub digest: String,
    pub transaction: String,
    pub location: String,
}

#[derive(Serialize)]
pub struct VerifyResponse {
    pub id: RecordId,
    pub valid: bool,
    pub tampered: bool,
    pub current_digest: String,
    pub stored_digest: String,
    pub registered_at: u64,
}

impl From<Verification> for VerifyResponse {
    fn from(v: Verification) -> Self {
        Self {
            id: v.id,
            valid: v.valid,
            tampered: v.tampered(),
            current_digest: v.current_digest.to_hex(),
            stored_digest: v.stored_digest.to_hex(),
            registered_at: v.registered_at,
        }
    }
}

/// `POST /v1/records` — register raw file bytes.
pub async fn register_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let mime = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    if let Some(mime) = mime {
        if !state.config.media_type_allowed(mime) {
            return Err(ApiError::new(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                format!("unsupported media type: {mime}"),
            ));
        }
    }

    // The declared type rides along into storage so the blob is tagged with
    // what the client uploaded, not the registrar default.
    let registration = match mime {
        Some(mime) => {
            state
                .registrar
                .register_as(&body, &MediaType::new(mime))
                .await?
        }
        None => state.registrar.register(&body).await?,
    };
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: registration.id,
            digest: registration.digest.to_hex(),
            transaction: registration.transaction.to_hex(),
            location: registration.location.to_string(),
        }),
    ))
}

/// `GET /v1/records/{id}` — verify the stored copy against the ledger.
pub async fn verify_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let id = RecordId::parse(&id).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let verification = state.verifier.verify(&id).await?;
    Ok(Json(verification.into()))
}

/// Health check handler.
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Info handler.
pub async fn info_handler() -> Json<serde_json::Value> {
    Json(json!({
        "name": "mseal-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
