//! Per-subsystem checks and the aggregate report.

use serde::{Deserialize, Serialize};

/// Backlog share of queue capacity above which the feedback queue is degraded.
const QUEUE_PRESSURE: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsystemHealth {
    pub name: String,
    pub status: HealthStatus,
    pub message: Option<String>,
}

/// Raw facts gathered from the running engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub fragment_count: usize,
    pub value_entry_count: usize,
    pub indexed_fragments: usize,
    pub vocabulary_size: usize,
    pub cluster_count: usize,
    pub quantizer_fitted: bool,
    pub embedding_provider: String,
    pub embedding_available: bool,
    pub embedding_degraded: bool,
    pub embedding_cache_entries: u64,
    pub queue_capacity: usize,
    pub queue_backlog: usize,
    pub queue_running: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub overall_status: HealthStatus,
    pub subsystems: Vec<SubsystemHealth>,
    pub snapshot: HealthSnapshot,
}

impl HealthReport {
    pub fn subsystem(&self, name: &str) -> Option<&SubsystemHealth> {
        self.subsystems.iter().find(|s| s.name == name)
    }
}

pub struct HealthReporter;

impl HealthReporter {
    pub fn build(snapshot: &HealthSnapshot) -> HealthReport {
        let subsystems = vec![
            Self::check_storage(snapshot),
            Self::check_sparse_index(snapshot),
            Self::check_quantizer(snapshot),
            Self::check_embeddings(snapshot),
            Self::check_feedback_queue(snapshot),
        ];
        let overall_status = subsystems
            .iter()
            .map(|s| s.status)
            .max()
            .unwrap_or(HealthStatus::Healthy);
        HealthReport {
            overall_status,
            subsystems,
            snapshot: snapshot.clone(),
        }
    }

    /// Storage: degraded while empty.
    fn check_storage(s: &HealthSnapshot) -> SubsystemHealth {
        if s.fragment_count == 0 {
            status("storage", HealthStatus::Degraded, Some("no fragments stored"))
        } else {
            status("storage", HealthStatus::Healthy, None)
        }
    }

    /// Sparse index: degraded when it covers fewer fragments than the store.
    fn check_sparse_index(s: &HealthSnapshot) -> SubsystemHealth {
        if s.indexed_fragments < s.fragment_count {
            status(
                "sparse_index",
                HealthStatus::Degraded,
                Some("index is behind the store; rebuild it"),
            )
        } else {
            status("sparse_index", HealthStatus::Healthy, None)
        }
    }

    /// Quantizer: degraded while unfitted, since every query maps to one cluster.
    fn check_quantizer(s: &HealthSnapshot) -> SubsystemHealth {
        if s.quantizer_fitted {
            status("quantizer", HealthStatus::Healthy, None)
        } else {
            status(
                "quantizer",
                HealthStatus::Degraded,
                Some("no partition fitted; all queries share cluster 0"),
            )
        }
    }

    /// Embeddings: unhealthy when unavailable, degraded when on a fallback.
    fn check_embeddings(s: &HealthSnapshot) -> SubsystemHealth {
        if !s.embedding_available {
            status("embeddings", HealthStatus::Unhealthy, Some("no embedding provider available"))
        } else if s.embedding_degraded {
            status(
                "embeddings",
                HealthStatus::Degraded,
                Some("running on a fallback embedding provider"),
            )
        } else {
            status("embeddings", HealthStatus::Healthy, None)
        }
    }

    /// Feedback queue: unhealthy when stopped, degraded under back-pressure.
    fn check_feedback_queue(s: &HealthSnapshot) -> SubsystemHealth {
        if !s.queue_running {
            status(
                "feedback_queue",
                HealthStatus::Unhealthy,
                Some("feedback worker is not running"),
            )
        } else if s.queue_capacity > 0
            && s.queue_backlog as f64 / s.queue_capacity as f64 > QUEUE_PRESSURE
        {
            status(
                "feedback_queue",
                HealthStatus::Degraded,
                Some("feedback backlog above 80% of capacity"),
            )
        } else {
            status("feedback_queue", HealthStatus::Healthy, None)
        }
    }
}

fn status(name: &str, status: HealthStatus, message: Option<&str>) -> SubsystemHealth {
    SubsystemHealth {
        name: name.to_string(),
        status,
        message: message.map(str::to_string),
    }
}
