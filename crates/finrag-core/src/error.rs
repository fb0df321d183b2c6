//! Error types for finrag core.
//!
//! Chunking and classification are total over well-formed input; only
//! configuration misuse raises. Relevance extraction never raises (see
//! [`crate::relevance`]). Store and embedder failures surface as
//! [`RagError::Upstream`] and are never retried here.

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, RagError>;

#[derive(Debug, Error)]
pub enum RagError {
    /// Invalid chunking or retrieval parameters.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Caller-supplied input that cannot be processed (no documents, k = 0).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The vector store or embedding backend failed or is unreachable.
    #[error("Upstream unavailable: {0:#}")]
    Upstream(#[source] anyhow::Error),
}

impl RagError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream(_))
    }
}
