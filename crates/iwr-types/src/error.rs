use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid entity id {id:?}: {reason}")]
    InvalidId { id: String, reason: String },

    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    #[error("malformed reference tag: {0:?}")]
    MalformedReference(String),
}
