/// Retrieval subsystem errors.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("retrieval unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("quantizer fit failed: {reason}")]
    FitFailed { reason: String },

    #[error("index lock poisoned: {component}")]
    LockPoisoned { component: String },
}
