//! Central metrics registry.
//!
//! Counters are atomics so recording needs only `&self`; [`MetricsCollector::snapshot`]
//! produces a serializable view.

pub mod feedback_metrics;
pub mod selection_metrics;

pub use feedback_metrics::{FeedbackMetrics, FeedbackMetricsSnapshot};
pub use selection_metrics::{SelectionMetrics, SelectionMetricsSnapshot};

use serde::{Deserialize, Serialize};

#[derive(Debug, Default)]
pub struct MetricsCollector {
    pub selection: SelectionMetrics,
    pub feedback: FeedbackMetrics,
}

/// Serializable view of every collector.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub selection: SelectionMetricsSnapshot,
    pub feedback: FeedbackMetricsSnapshot,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            selection: self.selection.snapshot(),
            feedback: self.feedback.snapshot(),
        }
    }

    pub fn reset(&self) {
        self.selection.reset();
        self.feedback.reset();
    }
}
