//! [`ObservabilityEngine`]: owns metrics and degradation tracking, and turns
//! health snapshots into reports.

use std::sync::Mutex;

use tessera_core::errors::{TesseraError, TesseraResult};
use tessera_core::models::DegradationEvent;

use crate::degradation::{evaluate_alerts, DegradationAlert, DegradationTracker};
use crate::health::{HealthReport, HealthReporter, HealthSnapshot, HealthStatus, SubsystemHealth};
use crate::metrics::{MetricsCollector, MetricsSnapshot};

#[derive(Debug, Default)]
pub struct ObservabilityEngine {
    pub metrics: MetricsCollector,
    degradation: Mutex<DegradationTracker>,
}

impl ObservabilityEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn tracker(&self) -> std::sync::MutexGuard<'_, DegradationTracker> {
        self.degradation.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn record_degradation(&self, event: DegradationEvent) {
        self.tracker().record(event);
    }

    pub fn mark_recovered(&self, component: &str) {
        self.tracker().mark_recovered(component);
    }

    pub fn degradation_alerts(&self) -> Vec<DegradationAlert> {
        evaluate_alerts(&self.tracker())
    }

    /// Report for `snapshot`, with an extra `degradation` subsystem when any
    /// component is still running on a fallback.
    pub fn health_report(&self, snapshot: HealthSnapshot) -> HealthReport {
        let mut report = HealthReporter::build(&snapshot);
        let active: Vec<String> = self
            .tracker()
            .active_degradations()
            .iter()
            .map(|t| t.event.component.clone())
            .collect();
        if !active.is_empty() {
            let mut components = active;
            components.sort();
            components.dedup();
            report.subsystems.push(SubsystemHealth {
                name: "degradation".to_string(),
                status: HealthStatus::Degraded,
                message: Some(format!("degraded components: {}", components.join(", "))),
            });
            report.overall_status = report.overall_status.max(HealthStatus::Degraded);
        }
        report
    }

    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Metrics and alert state as JSON, for persisting or shipping elsewhere.
    pub fn metrics_json(&self) -> TesseraResult<serde_json::Value> {
        let metrics = serde_json::to_value(self.metrics.snapshot())
            .map_err(TesseraError::SerializationError)?;
        let alerts = serde_json::to_value(self.degradation_alerts())
            .map_err(TesseraError::SerializationError)?;
        Ok(serde_json::json!({
            "metrics": metrics,
            "alerts": alerts,
        }))
    }

    pub fn reset_metrics(&self) {
        self.metrics.reset();
    }
}
