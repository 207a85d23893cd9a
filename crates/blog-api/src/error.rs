//! REST adapter errors and their mapping onto the domain taxonomy

use blog_core::{DomainError, FieldErrors};
use serde_json::Value;
use thiserror::Error;

/// Result type for raw HTTP calls
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors raised while talking to the backend
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, timeout or body read failures
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response; `details` is the `message` member of the error body, if any
    #[error("Server responded {status}: {message}")]
    Status {
        status: u16,
        message: String,
        details: Option<Value>,
    },

    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(err) => err.status().map(|status| status.as_u16()),
            Self::Status { status, .. } => Some(*status),
            Self::Decode(_) => None,
        }
    }
}

impl From<ApiError> for DomainError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status {
                status: 400,
                message,
                details,
            } => {
                let mut fields = details
                    .as_ref()
                    .map(FieldErrors::from_server_message)
                    .unwrap_or_default();
                if fields.is_empty() {
                    fields.add_general(message);
                }
                Self::Validation(fields)
            }
            ApiError::Status { status: 401, .. } => Self::Unauthenticated,
            ApiError::Status {
                status: 404,
                message,
                ..
            } => Self::NotFound(message),
            ApiError::Status {
                status, message, ..
            } => Self::Fetch {
                status: Some(status),
                message,
            },
            other => Self::Fetch {
                status: other.status(),
                message: other.to_string(),
            },
        }
    }
}
