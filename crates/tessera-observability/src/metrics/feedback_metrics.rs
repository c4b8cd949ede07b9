//! Feedback counters: outcomes by storage action, update failures, mean reward.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use tessera_core::models::{FeedbackOutcome, StorageAction};

use super::selection_metrics::ratio;

/// Rewards are accumulated in millionths so the sum fits an atomic integer.
const REWARD_SCALE: f64 = 1_000_000.0;

#[derive(Debug, Default)]
pub struct FeedbackMetrics {
    accepted: AtomicU64,
    rejected: AtomicU64,
    processed: AtomicU64,
    stored: AtomicU64,
    scored_only: AtomicU64,
    skipped: AtomicU64,
    duplicates: AtomicU64,
    storage_failures: AtomicU64,
    value_updates: AtomicU64,
    update_failures: AtomicU64,
    reward_micros: AtomicU64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeedbackMetricsSnapshot {
    pub accepted: u64,
    pub rejected: u64,
    pub processed: u64,
    pub stored: u64,
    pub scored_only: u64,
    pub skipped: u64,
    pub duplicates: u64,
    pub storage_failures: u64,
    pub value_updates: u64,
    pub update_failures: u64,
    pub mean_reward: f64,
}

impl FeedbackMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_submission(&self, accepted: bool) {
        let counter = if accepted { &self.accepted } else { &self.rejected };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of one processed event.
    pub fn record(&self, outcome: &FeedbackOutcome) {
        self.processed.fetch_add(1, Ordering::Relaxed);
        let action = match outcome.action {
            StorageAction::Stored { .. } => &self.stored,
            StorageAction::ScoredOnly => &self.scored_only,
            StorageAction::Skipped => &self.skipped,
            StorageAction::Duplicate { .. } => &self.duplicates,
            StorageAction::Failed => &self.storage_failures,
        };
        action.fetch_add(1, Ordering::Relaxed);
        self.value_updates
            .fetch_add(outcome.updated as u64, Ordering::Relaxed);
        self.update_failures
            .fetch_add(outcome.update_failures as u64, Ordering::Relaxed);
        let micros = (outcome.reward.clamp(0.0, 1.0) * REWARD_SCALE).round() as u64;
        self.reward_micros.fetch_add(micros, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> FeedbackMetricsSnapshot {
        let processed = self.processed.load(Ordering::Relaxed);
        FeedbackMetricsSnapshot {
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            processed,
            stored: self.stored.load(Ordering::Relaxed),
            scored_only: self.scored_only.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            storage_failures: self.storage_failures.load(Ordering::Relaxed),
            value_updates: self.value_updates.load(Ordering::Relaxed),
            update_failures: self.update_failures.load(Ordering::Relaxed),
            mean_reward: ratio(self.reward_micros.load(Ordering::Relaxed), processed)
                / REWARD_SCALE,
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.accepted,
            &self.rejected,
            &self.processed,
            &self.stored,
            &self.scored_only,
            &self.skipped,
            &self.duplicates,
            &self.storage_failures,
            &self.value_updates,
            &self.update_failures,
            &self.reward_micros,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(reward: f64, action: StorageAction) -> FeedbackOutcome {
        FeedbackOutcome {
            reward,
            cluster_id: 0,
            updated: 2,
            update_failures: 0,
            action,
        }
    }

    #[test]
    fn mean_reward_and_actions() {
        let m = FeedbackMetrics::new();
        m.record(&outcome(0.86, StorageAction::Stored { fragment_id: "g".into() }));
        m.record(&outcome(0.65, StorageAction::ScoredOnly));
        let snap = m.snapshot();
        assert_eq!(snap.processed, 2);
        assert_eq!(snap.stored, 1);
        assert_eq!(snap.scored_only, 1);
        assert_eq!(snap.value_updates, 4);
        assert!((snap.mean_reward - 0.755).abs() < 1e-6);

        m.reset();
        assert_eq!(m.snapshot(), FeedbackMetricsSnapshot::default());
    }
}
