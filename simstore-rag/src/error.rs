//! Error types for the `simstore-rag` crate.

use std::time::Duration;

use simstore_auth::AuthError;
use thiserror::Error;

/// Errors that can occur while indexing, searching, or deleting documents.
#[derive(Debug, Error)]
pub enum RagError {
    /// A required argument was missing or empty. Raised before any upstream call.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// An upstream call did not complete within the configured timeout.
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        /// The upstream operation that timed out.
        operation: &'static str,
        /// The configured timeout.
        after: Duration,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The access gate rejected the operation.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl RagError {
    /// Whether this error originates from the embedding provider or vector
    /// store (including timeouts talking to them).
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            RagError::EmbeddingError { .. }
                | RagError::VectorStoreError { .. }
                | RagError::Timeout { .. }
        )
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
