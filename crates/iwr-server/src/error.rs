use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use iwr_refs::RefError;
use iwr_sdk::SdkError;
use iwr_store::StoreError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("warehouse unavailable: {0}")]
    Unavailable(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SdkError> for ServerError {
    fn from(e: SdkError) -> Self {
        let message = e.to_string();
        match e {
            SdkError::UnknownCollection(_) => Self::NotFound(message),
            SdkError::InvalidId(_) => Self::BadRequest(message),
            SdkError::Ref(RefError::NotFound(_)) => Self::NotFound(message),
            SdkError::Ref(RefError::Transport(_)) => Self::Unavailable(message),
            SdkError::Ref(RefError::MalformedPayload(_) | RefError::Unsupported { .. }) => {
                Self::BadRequest(message)
            }
            SdkError::Store(
                StoreError::NotFound { .. }
                | StoreError::CollectionNotFound(_)
                | StoreError::PathNotFound(_),
            ) => Self::NotFound(message),
            SdkError::Store(StoreError::Config(_)) => Self::Config(message),
            SdkError::Store(StoreError::Transport(_) | StoreError::Decode(_)) => {
                Self::Unavailable(message)
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, "request failed");
        }
        let body = json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });
        (status, Json(body)).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
