use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};

use iwr_refs::DEFAULT_SCAN_CONCURRENCY;
use iwr_store::StoreConfig;

use crate::error::{ServerError, ServerResult};

/// Server settings, loadable from a TOML file. Missing keys take defaults.
///
/// ```toml
/// bind_addr = "0.0.0.0:9091"
/// scan_concurrency = 16
///
/// [store]
/// base_url = "http://warehouse:9090"
/// timeout_secs = 10
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Member fetches in flight per collection scan.
    pub scan_concurrency: usize,
    pub store: StoreConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 9091)),
            scan_concurrency: DEFAULT_SCAN_CONCURRENCY,
            store: StoreConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(text: &str) -> ServerResult<Self> {
        toml::from_str(text).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> ServerResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }
}
