/// Feedback loop errors. These are logged and swallowed by the loop itself;
/// they only surface through queue administration.
#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    #[error("feedback queue is full (capacity {capacity})")]
    QueueFull { capacity: usize },

    #[error("feedback queue is closed")]
    QueueClosed,

    #[error("no tokio runtime available to host the feedback worker")]
    NoRuntime,

    #[error("re-ingestion failed: {reason}")]
    ReingestionFailed { reason: String },
}
