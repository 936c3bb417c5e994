use iwr_types::{EntityId, EntityType};

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object does not exist.
    #[error("object not found: {collection}/{id}")]
    NotFound { collection: EntityType, id: EntityId },

    /// The collection itself is absent from the store.
    #[error("collection not found: {0}")]
    CollectionNotFound(EntityType),

    /// Nothing exists at a raw resource path.
    #[error("no such resource: /{0}")]
    PathNotFound(String),

    /// The remote call failed, timed out, or returned an unexpected status.
    #[error("transport error: {0}")]
    Transport(String),

    /// The store answered with a body that could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The client could not be built from its configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::CollectionNotFound(_) | Self::PathNotFound(_)
        )
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Transport(format!("timed out: {e}"))
        } else {
            Self::Transport(e.to_string())
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
