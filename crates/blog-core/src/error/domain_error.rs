//! Domain errors - error types shared by the stores and the REST adapter

use thiserror::Error;

use crate::error::FieldErrors;
use crate::value_objects::PostId;

/// Domain layer errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    // =========================================================================
    // Rejected before any state change or network call
    // =========================================================================
    #[error("Login required")]
    Unauthenticated,

    #[error("Only the author can modify this resource")]
    NotAuthor,

    #[error("A reaction toggle is already in flight for post {0}")]
    AlreadyInFlight(PostId),

    #[error("Page {requested} is out of range (1..={total_pages})")]
    InvalidPage { requested: u32, total_pages: u32 },

    #[error("{operation} is not available in this feed's merge mode")]
    WrongMergeMode { operation: &'static str },

    // =========================================================================
    // Reported by validation or by the backend
    // =========================================================================
    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Fetch failed: {message}")]
    Fetch { status: Option<u16>, message: String },
}

impl DomainError {
    /// Create a fetch error without an HTTP status (transport failure)
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            status: None,
            message: message.into(),
        }
    }

    /// Get an error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::NotAuthor => "NOT_AUTHOR",
            Self::AlreadyInFlight(_) => "ALREADY_IN_FLIGHT",
            Self::InvalidPage { .. } => "INVALID_PAGE",
            Self::WrongMergeMode { .. } => "WRONG_MERGE_MODE",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Fetch { .. } => "FETCH_ERROR",
        }
    }

    /// Errors raised locally before any mutation or request was attempted
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Unauthenticated
                | Self::NotAuthor
                | Self::AlreadyInFlight(_)
                | Self::InvalidPage { .. }
                | Self::WrongMergeMode { .. }
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::Unauthenticated | Self::NotAuthor)
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this error came from the transport or the server
    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::NotFound(_))
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(FieldErrors::from(errors))
    }
}
