//! Error taxonomy: one enum per subsystem, folded into [`TesseraError`].

mod embedding_error;
mod feedback_error;
mod retrieval_error;
mod storage_error;

pub use embedding_error::EmbeddingError;
pub use feedback_error::FeedbackError;
pub use retrieval_error::RetrievalError;
pub use storage_error::StorageError;

/// Top-level error for every Tessera operation.
#[derive(Debug, thiserror::Error)]
pub enum TesseraError {
    #[error("fragment not found: {id}")]
    FragmentNotFound { id: String },

    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    StorageError(#[from] StorageError),

    #[error(transparent)]
    EmbeddingError(#[from] EmbeddingError),

    #[error(transparent)]
    RetrievalError(#[from] RetrievalError),

    #[error(transparent)]
    FeedbackError(#[from] FeedbackError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("concurrency error: {0}")]
    ConcurrencyError(String),
}

impl TesseraError {
    /// Shorthand for a malformed-input rejection.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Whether the error means a dependency (store or provider) could not be reached.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::StorageError(_)
                | Self::RetrievalError(RetrievalError::Unavailable { .. })
                | Self::EmbeddingError(EmbeddingError::ProviderUnavailable { .. })
        )
    }
}

/// Result alias used across the workspace.
pub type TesseraResult<T> = Result<T, TesseraError>;
