//! Remote client error types
//!
//! Every failure carries the action being attempted ("list datasets",
//! "create marker") so the message reads the same regardless of layer.

use thiserror::Error;

/// Result type for remote client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Failure reported by a [`Transport`](super::Transport) before any
/// response was received (DNS, connect, TLS, timeout).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransportFailure(pub String);

/// Remote client errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The remote API answered with a non-success status
    #[error("Failed to {action}: {status} {status_text}{}", body_suffix(.body))]
    Remote {
        action: &'static str,
        status: u16,
        status_text: String,
        body: Option<String>,
    },

    /// The request never completed
    #[error("Failed to {action}: {message}")]
    Transport {
        action: &'static str,
        message: String,
    },

    /// A success status carried a body that is not JSON
    #[error("Failed to {action}: response is not valid JSON: {message}")]
    InvalidResponse {
        action: &'static str,
        message: String,
    },

    /// The outbound body could not be serialized
    #[error("Failed to encode request body: {0}")]
    Encode(String),

    /// Client construction failed
    #[error("Invalid client configuration: {0}")]
    Configuration(String),
}

fn body_suffix(body: &Option<String>) -> String {
    match body {
        Some(text) => format!(" ({})", text),
        None => String::new(),
    }
}

impl ClientError {
    /// Stable code string for payloads and logs
    pub fn code(&self) -> &'static str {
        match self {
            ClientError::Remote { .. } => "REMOTE_ERROR",
            ClientError::Transport { .. } => "TRANSPORT_ERROR",
            ClientError::InvalidResponse { .. } => "INVALID_RESPONSE",
            ClientError::Encode(_) => "ENCODE_ERROR",
            ClientError::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }

    /// HTTP status of a remote failure
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Encode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_message_includes_body() {
        let err = ClientError::Remote {
            action: "get dataset",
            status: 404,
            status_text: "Not Found".to_string(),
            body: Some(r#"{"error":"dataset not found"}"#.to_string()),
        };
        assert_eq!(
            err.to_string(),
            r#"Failed to get dataset: 404 Not Found ({"error":"dataset not found"})"#
        );
        assert_eq!(err.code(), "REMOTE_ERROR");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_remote_error_without_body() {
        let err = ClientError::Remote {
            action: "list boards",
            status: 401,
            status_text: "Unauthorized".to_string(),
            body: None,
        };
        assert_eq!(err.to_string(), "Failed to list boards: 401 Unauthorized");
    }

    #[test]
    fn test_transport_error_message() {
        let err = ClientError::Transport {
            action: "list datasets",
            message: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(err.status(), None);
    }
}
