use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use mseal_core::{RegistrationService, VerificationService};
use mseal_ledger::{FileLedger, Ledger};
use mseal_store::{ContentStore, FsContentStore};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::{build_router, AppState};

/// MediaSeal record server.
///
/// Owns durable collaborators (filesystem blob store, file ledger) rooted
/// under the configured data directory, and serves the REST API over them.
pub struct SealServer {
    config: ServerConfig,
    state: AppState,
}

impl SealServer {
    /// Construct the server, opening its backends. Backend failures here are
    /// fatal startup errors.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let store: Arc<dyn ContentStore> =
            Arc::new(FsContentStore::open(config.data_root.join("blobs"))?);
        let ledger: Arc<dyn Ledger> =
            Arc::new(FileLedger::open(config.data_root.join("ledger.seg"))?);
        Ok(Self::with_collaborators(config, store, ledger))
    }

    /// Construct over explicit collaborators (tests, embedding).
    pub fn with_collaborators(
        config: ServerConfig,
        store: Arc<dyn ContentStore>,
        ledger: Arc<dyn Ledger>,
    ) -> Self {
        let mut registrar =
            RegistrationService::new(Arc::clone(&store), Arc::clone(&ledger));
        let mut verifier = VerificationService::new(store, ledger);
        if let Some(limit) = config.op_timeout() {
            registrar = registrar.with_timeout(limit);
            verifier = verifier.with_timeout(limit);
        }
        let state = AppState {
            registrar: Arc::new(registrar),
            verifier: Arc::new(verifier),
            config: Arc::new(config.clone()),
        };
        Self { config, state }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        info!("mseal server listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
