use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    #[error("invalid id: {0}")]
    InvalidId(String),

    #[error(transparent)]
    Ref(#[from] iwr_refs::RefError),

    #[error("store error: {0}")]
    Store(#[from] iwr_store::StoreError),
}

impl From<iwr_types::TypeError> for SdkError {
    fn from(e: iwr_types::TypeError) -> Self {
        match e {
            iwr_types::TypeError::UnknownCollection(name) => Self::UnknownCollection(name),
            other => Self::InvalidId(other.to_string()),
        }
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
