//! Dispatch error types
//!
//! Every variant is caught at the dispatcher boundary and turned into an
//! error-shaped content envelope; none of them reaches the caller as a
//! protocol fault.

use thiserror::Error;

use crate::client::ClientError;
use crate::observability::FailureKind;

/// Result type for dispatch operations
pub type DispatchResult<T> = Result<T, DispatchError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Argument bag absent, not an object, or not decodable
    #[error("{0}")]
    Validation(String),

    /// Operation name not in the registry
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// Required fields absent; lists every missing field
    #[error("Missing required field(s): {}", .0.join(", "))]
    MissingField(Vec<String>),

    /// Failure raised by the remote client
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl DispatchError {
    pub fn validation(reason: impl Into<String>) -> Self {
        DispatchError::Validation(reason.into())
    }

    /// Stable code string for payloads and logs
    pub fn code(&self) -> &'static str {
        match self {
            DispatchError::Validation(_) => "VALIDATION_ERROR",
            DispatchError::UnknownOperation(_) => "UNKNOWN_OPERATION",
            DispatchError::MissingField(_) => "MISSING_FIELD",
            DispatchError::Client(e) => e.code(),
        }
    }

    /// Metrics bucket for this failure
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            DispatchError::Validation(_) => FailureKind::Validation,
            DispatchError::UnknownOperation(_) => FailureKind::UnknownOperation,
            DispatchError::MissingField(_) => FailureKind::MissingField,
            DispatchError::Client(ClientError::Remote { .. }) => FailureKind::Remote,
            DispatchError::Client(ClientError::Transport { .. }) => FailureKind::Transport,
            DispatchError::Client(ClientError::InvalidResponse { .. }) => {
                FailureKind::InvalidResponse
            }
            DispatchError::Client(ClientError::Encode(_))
            | DispatchError::Client(ClientError::Configuration(_)) => FailureKind::Validation,
        }
    }

    /// Rejected locally, before any remote call was attempted
    pub fn is_local(&self) -> bool {
        !matches!(self, DispatchError::Client(_))
    }
}
