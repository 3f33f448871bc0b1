//! Backend Errors
//!
//! Every way a call to the PolicyBot backend can fail. Views never show
//! these to the user directly; they collapse them into fixed notices. The
//! variants exist so logs and the upload outcome can say what went wrong.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by [`DocsBackend`](crate::api::DocsBackend) calls
#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport failure (connection refused, timeout, reset)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Backend returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// Response body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Selected file could not be read
    #[error("Failed to read {path}: {source}")]
    ReadFile {
        /// Path of the selected file
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// A URL could not be built from the configured origin
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The request task ended without reporting (panicked or aborted)
    #[error("Request task ended unexpectedly: {0}")]
    TaskFailed(String),
}

impl BackendError {
    /// Whether this error came from the HTTP status rather than the transport
    #[must_use]
    pub fn is_status(&self) -> bool {
        matches!(self, Self::Status { .. })
    }

    /// Short label for log fields
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Status { .. } => "status",
            Self::Decode(_) => "decode",
            Self::ReadFile { .. } => "read_file",
            Self::InvalidUrl(_) => "invalid_url",
            Self::TaskFailed(_) => "task_failed",
        }
    }
}

/// Result alias for backend calls
pub type BackendResult<T> = Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        let err = BackendError::Status {
            status: 404,
            body: "Document not found".to_string(),
        };
        assert_eq!(err.to_string(), "Backend returned 404: Document not found");
        assert!(err.is_status());
        assert_eq!(err.kind(), "status");
    }

    #[test]
    fn test_read_file_display() {
        let err = BackendError::ReadFile {
            path: PathBuf::from("/tmp/missing.pdf"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert!(err.to_string().contains("/tmp/missing.pdf"));
        assert!(!err.is_status());
    }
}
