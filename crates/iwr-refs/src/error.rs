//! Error types for reference operations.

use iwr_store::StoreError;
use iwr_types::{Direction, EntityType};
use thiserror::Error;

/// Errors that can occur while recording or resolving references.
#[derive(Debug, Error)]
pub enum RefError {
    /// The queried or referenced object, or a whole collection, is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// A store call failed, timed out, or returned something undecodable.
    #[error("transport error: {0}")]
    Transport(String),

    /// A recorder payload lacks the id fields it must carry.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// The hierarchy has no relation in this direction for this type.
    #[error("{entity} has no {direction}")]
    Unsupported {
        entity: EntityType,
        direction: Direction,
    },
}

impl From<StoreError> for RefError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { .. }
            | StoreError::CollectionNotFound(_)
            | StoreError::PathNotFound(_) => Self::NotFound(e.to_string()),
            StoreError::Transport(_) | StoreError::Decode(_) | StoreError::Config(_) => {
                Self::Transport(e.to_string())
            }
        }
    }
}

/// Convenience type alias for reference operations.
pub type Result<T> = std::result::Result<T, RefError>;
