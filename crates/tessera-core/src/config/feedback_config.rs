use serde::{Deserialize, Serialize};

use super::defaults;

/// Feedback and reinforcement loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Rewards at or above this re-ingest the generated text.
    pub high_quality_threshold: f64,
    /// Rewards between this and the high threshold are scored only.
    pub medium_quality_threshold: f64,
    /// Generated text must be strictly longer than this (in chars) to be stored.
    pub min_content_chars: usize,
    /// Bounded queue capacity.
    pub queue_capacity: usize,
    /// Per-event processing timeout.
    pub event_timeout_secs: u64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            high_quality_threshold: defaults::DEFAULT_HIGH_QUALITY_THRESHOLD,
            medium_quality_threshold: defaults::DEFAULT_MEDIUM_QUALITY_THRESHOLD,
            min_content_chars: defaults::DEFAULT_MIN_CONTENT_CHARS,
            queue_capacity: defaults::DEFAULT_QUEUE_CAPACITY,
            event_timeout_secs: defaults::DEFAULT_EVENT_TIMEOUT_SECS,
        }
    }
}
