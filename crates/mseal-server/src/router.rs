use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use mseal_core::{RegistrationService, VerificationService};

use crate::config::ServerConfig;
use crate::handler;

/// Shared handler state: the two core services plus request policy.
#[derive(Clone)]
pub struct AppState {
    pub registrar: Arc<RegistrationService>,
    pub verifier: Arc<VerificationService>,
    pub config: Arc<ServerConfig>,
}

/// Build the axum router with all MediaSeal endpoints.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/v1/records", post(handler::register_handler))
        .route("/v1/records/:id", get(handler::verify_handler))
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/info", get(handler::info_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
