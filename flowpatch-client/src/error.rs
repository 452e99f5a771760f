//! Error types for the Flowpatch store client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to the workflow store
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Store returned an error status code
    #[error("store error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the store
        message: String,
    },

    /// The version-tag precondition on a write was not met (the document
    /// changed between read and write)
    #[error("version precondition failed")]
    PreconditionFailed,

    /// Workflow not found
    #[error("workflow not found: {0}")]
    NotFound(String),

    /// Failed to parse response
    #[error("failed to parse response: {0}")]
    ParseError(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_)) || matches!(self, Self::ApiError { status: 404, .. })
    }

    /// Check if this error is a version-precondition conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::PreconditionFailed)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_predicate_covers_both_shapes() {
        assert!(ClientError::NotFound("wf_1".to_string()).is_not_found());
        assert!(ClientError::api_error(404, "no such workflow").is_not_found());
        assert!(!ClientError::api_error(500, "boom").is_not_found());
    }

    #[test]
    fn test_conflict_predicate() {
        assert!(ClientError::PreconditionFailed.is_conflict());
        assert!(!ClientError::api_error(409, "conflict").is_conflict());
    }

    #[test]
    fn test_server_error_predicate() {
        assert!(ClientError::api_error(500, "boom").is_server_error());
        assert!(ClientError::api_error(503, "unavailable").is_server_error());
        assert!(!ClientError::api_error(404, "missing").is_server_error());
        assert!(!ClientError::PreconditionFailed.is_server_error());
    }

    #[test]
    fn test_api_error_message() {
        let err = ClientError::api_error(422, "bad payload");
        assert_eq!(err.to_string(), "store error (status 422): bad payload");
    }
}
