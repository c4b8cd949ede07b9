//! Selection counters: volume, candidate path, explore/exploit split, latency.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use tessera_core::errors::TesseraError;
use tessera_core::models::{CandidatePath, SelectionMode, SelectionResult};

#[derive(Debug, Default)]
pub struct SelectionMetrics {
    requests: AtomicU64,
    sparse_path: AtomicU64,
    fallback_path: AtomicU64,
    empty_results: AtomicU64,
    explore_picks: AtomicU64,
    exploit_picks: AtomicU64,
    invalid_requests: AtomicU64,
    unavailable: AtomicU64,
    total_latency_us: AtomicU64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectionMetricsSnapshot {
    pub requests: u64,
    pub sparse_path: u64,
    pub fallback_path: u64,
    pub empty_results: u64,
    pub explore_picks: u64,
    pub exploit_picks: u64,
    pub invalid_requests: u64,
    pub unavailable: u64,
    /// Mean latency of successful selections, in microseconds.
    pub avg_latency_us: f64,
    /// Share of successful selections that needed the global fallback.
    pub fallback_rate: f64,
}

impl SelectionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful selection.
    pub fn record(&self, result: &SelectionResult, latency: Duration) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        let path = match result.path {
            CandidatePath::Sparse => &self.sparse_path,
            CandidatePath::GlobalFallback => &self.fallback_path,
            CandidatePath::Empty => &self.empty_results,
        };
        path.fetch_add(1, Ordering::Relaxed);
        for pick in &result.picks {
            let mode = match pick.mode {
                SelectionMode::Explore => &self.explore_picks,
                SelectionMode::Exploit => &self.exploit_picks,
            };
            mode.fetch_add(1, Ordering::Relaxed);
        }
        let micros = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX);
        self.total_latency_us.fetch_add(micros, Ordering::Relaxed);
    }

    /// Record a failed selection.
    pub fn record_error(&self, error: &TesseraError) {
        if error.is_unavailable() {
            self.unavailable.fetch_add(1, Ordering::Relaxed);
        } else if matches!(error, TesseraError::InvalidInput { .. }) {
            self.invalid_requests.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> SelectionMetricsSnapshot {
        let requests = self.requests.load(Ordering::Relaxed);
        let fallback_path = self.fallback_path.load(Ordering::Relaxed);
        let total_latency = self.total_latency_us.load(Ordering::Relaxed);
        SelectionMetricsSnapshot {
            requests,
            sparse_path: self.sparse_path.load(Ordering::Relaxed),
            fallback_path,
            empty_results: self.empty_results.load(Ordering::Relaxed),
            explore_picks: self.explore_picks.load(Ordering::Relaxed),
            exploit_picks: self.exploit_picks.load(Ordering::Relaxed),
            invalid_requests: self.invalid_requests.load(Ordering::Relaxed),
            unavailable: self.unavailable.load(Ordering::Relaxed),
            avg_latency_us: ratio(total_latency, requests),
            fallback_rate: ratio(fallback_path, requests),
        }
    }

    pub fn reset(&self) {
        for counter in [
            &self.requests,
            &self.sparse_path,
            &self.fallback_path,
            &self.empty_results,
            &self.explore_picks,
            &self.exploit_picks,
            &self.invalid_requests,
            &self.unavailable,
            &self.total_latency_us,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

pub(crate) fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
