use tokio::net::TcpListener;

use iwr_sdk::Relations;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;

/// Relations REST server.
pub struct IwrServer {
    config: ServerConfig,
    relations: Relations,
}

impl IwrServer {
    /// Build a server backed by the HTTP warehouse named in `config`.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let relations = Relations::connect(&config.store, config.scan_concurrency)?;
        Ok(Self::with_relations(config, relations))
    }

    /// Build a server over an existing relations handle.
    pub fn with_relations(config: ServerConfig, relations: Relations) -> Self {
        Self { config, relations }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.relations.clone())
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            bind_addr = %self.config.bind_addr,
            store = %self.config.store.base_url,
            "iwr server listening"
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_construction() {
        let server = IwrServer::new(ServerConfig::default()).unwrap();
        assert_eq!(server.config().bind_addr, "127.0.0.1:9091".parse().unwrap());
    }

    #[test]
    fn router_builds() {
        let server = IwrServer::new(ServerConfig::default()).unwrap();
        let _router = server.router();
    }
}
