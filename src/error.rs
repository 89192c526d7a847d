//! Error types for Scribe
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Scribe operations
///
/// Storage variants separate the fatal startup failure (`StorageUnavailable`)
/// from per-operation failures (`StorageIo`) so callers can decide whether to
/// abort or to report and carry on.
#[derive(Error, Debug)]
pub enum ScribeError {
    /// The persistent store could not be opened at all
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A single store operation failed
    #[error("Storage error: {0}")]
    StorageIo(String),

    /// User input was rejected before any write
    #[error("Validation error: {0}")]
    Validation(String),

    /// A note with the requested title already exists
    #[error("A note titled '{0}' already exists")]
    DuplicateTitle(String),

    /// The completion endpoint rejected or failed the request
    #[error("Completion error: {0}")]
    Completion(String),

    /// A referenced record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// An in-flight completion was superseded or cancelled
    #[error("Completion request was cancelled")]
    Cancelled,

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP client construction errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ScribeError {
    /// Whether this error should stop the application instead of being reported
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }
}

/// Result type alias for Scribe operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation. Callers that
/// need to branch on the failure kind downcast to [`ScribeError`].
pub type Result<T> = anyhow::Result<T>;

/// Downcast an `anyhow::Error` to a [`ScribeError`] if it carries one
pub fn as_scribe_error(err: &anyhow::Error) -> Option<&ScribeError> {
    err.downcast_ref::<ScribeError>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_unavailable_display() {
        let error = ScribeError::StorageUnavailable("database locked".to_string());
        assert_eq!(error.to_string(), "Storage unavailable: database locked");
    }

    #[test]
    fn test_storage_io_display() {
        let error = ScribeError::StorageIo("flush failed".to_string());
        assert_eq!(error.to_string(), "Storage error: flush failed");
    }

    #[test]
    fn test_duplicate_title_display() {
        let error = ScribeError::DuplicateTitle("Groceries".to_string());
        assert_eq!(error.to_string(), "A note titled 'Groceries' already exists");
    }

    #[test]
    fn test_completion_error_display() {
        let error = ScribeError::Completion("HTTP error! status: 401 - bad key".to_string());
        assert_eq!(
            error.to_string(),
            "Completion error: HTTP error! status: 401 - bad key"
        );
    }

    #[test]
    fn test_only_storage_unavailable_is_fatal() {
        assert!(ScribeError::StorageUnavailable("x".into()).is_fatal());
        assert!(!ScribeError::StorageIo("x".into()).is_fatal());
        assert!(!ScribeError::Validation("x".into()).is_fatal());
        assert!(!ScribeError::Cancelled.is_fatal());
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let err: anyhow::Error = ScribeError::NotFound("chat_1".to_string()).into();
        assert!(matches!(
            as_scribe_error(&err),
            Some(ScribeError::NotFound(id)) if id == "chat_1"
        ));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: ScribeError = io_error.into();
        assert!(matches!(error, ScribeError::Io(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: : yaml").unwrap_err();
        let error: ScribeError = yaml_error.into();
        assert!(matches!(error, ScribeError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ScribeError>();
    }
}
