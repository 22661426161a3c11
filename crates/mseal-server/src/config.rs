use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Server configuration, loadable from a TOML file.
///
/// Required at process start; an unreadable or invalid file is a fatal
/// startup error, never a per-call one.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Directory holding the blob store and the ledger segment.
    pub data_root: PathBuf,
    /// Upload size cap, matching the original bucket limit (50 MiB).
    pub max_upload_bytes: usize,
    /// Content types an upload may declare.
    pub allowed_media_types: Vec<String>,
    /// Per-collaborator-call timeout in seconds; 0 disables the bound.
    pub op_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".parse().expect("valid default addr"),
            data_root: PathBuf::from("./mseal-data"),
            max_upload_bytes: 50 * 1024 * 1024,
            allowed_media_types: vec![
                "video/mp4".into(),
                "video/mpeg".into(),
                "video/quicktime".into(),
            ],
            op_timeout_secs: 120,
        }
    }
}

impl ServerConfig {
    /// Load from a TOML file. Missing keys fall back to defaults.
    pub fn load(path: &Path) -> ServerResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ServerError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml(&raw)
    }

    /// Parse from TOML text.
    pub fn from_toml(raw: &str) -> ServerResult<Self> {
        toml::from_str(raw).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// The collaborator-call timeout, if bounded.
    pub fn op_timeout(&self) -> Option<Duration> {
        (self.op_timeout_secs > 0).then(|| Duration::from_secs(self.op_timeout_secs))
    }

    pub fn media_type_allowed(&self, mime: &str) -> bool {
        self.allowed_media_types.iter().any(|m| m == mime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:5000".parse::<SocketAddr>().unwrap());
        assert_eq!(c.max_upload_bytes, 50 * 1024 * 1024);
        assert!(c.media_type_allowed("video/mp4"));
        assert!(!c.media_type_allowed("image/png"));
        assert_eq!(c.op_timeout(), Some(Duration::from_secs(120)));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let c = ServerConfig::from_toml("bind_addr = \"0.0.0.0:8080\"").unwrap();
        assert_eq!(c.bind_addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(c.max_upload_bytes, 50 * 1024 * 1024);
    }

    #[test]
    fn zero_timeout_means_unbounded() {
        let c = ServerConfig::from_toml("op_timeout_secs = 0").unwrap();
        assert_eq!(c.op_timeout(), None);
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = ServerConfig::from_toml("bind_addr = 17").unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }
}
