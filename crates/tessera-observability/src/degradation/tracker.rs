//! Record every provider fallback with its recovery status, and raise alerts:
//! more than three events for one component within an hour → warning,
//! the same component degraded for over a day → critical.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use tessera_core::models::DegradationEvent;

/// Retained events; older ones are dropped first.
const MAX_TRACKED: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryStatus {
    Active,
    Recovered,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedDegradation {
    pub event: DegradationEvent,
    pub recovery_status: RecoveryStatus,
    pub recovered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct DegradationTracker {
    events: Vec<TrackedDegradation>,
}

impl DegradationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: DegradationEvent) {
        crate::tracing_setup::events::degradation_triggered(
            &event.component,
            &event.failure,
            &event.fallback_used,
        );
        self.events.push(TrackedDegradation {
            event,
            recovery_status: RecoveryStatus::Active,
            recovered_at: None,
        });
        if self.events.len() > MAX_TRACKED {
            self.events.drain(..self.events.len() - MAX_TRACKED);
        }
    }

    /// Mark every active degradation of `component` as recovered.
    pub fn mark_recovered(&mut self, component: &str) {
        let now = Utc::now();
        for tracked in self
            .events
            .iter_mut()
            .filter(|t| {
                t.event.component == component && t.recovery_status == RecoveryStatus::Active
            })
        {
            tracked.recovery_status = RecoveryStatus::Recovered;
            tracked.recovered_at = Some(now);
        }
    }

    pub fn events(&self) -> &[TrackedDegradation] {
        &self.events
    }

    pub fn active_degradations(&self) -> Vec<&TrackedDegradation> {
        self.events
            .iter()
            .filter(|t| t.recovery_status == RecoveryStatus::Active)
            .collect()
    }

    pub fn is_degraded(&self, component: &str) -> bool {
        self.events
            .iter()
            .any(|t| t.event.component == component && t.recovery_status == RecoveryStatus::Active)
    }

    /// Events for `component` in the last `window_secs` seconds.
    pub fn count_recent(&self, component: &str, window_secs: i64) -> usize {
        let cutoff = Utc::now() - Duration::seconds(window_secs);
        self.events
            .iter()
            .filter(|t| t.event.component == component && t.event.timestamp > cutoff)
            .count()
    }

    /// How long `component` has been continuously degraded.
    pub fn degraded_duration(&self, component: &str) -> Option<Duration> {
        let earliest = self
            .events
            .iter()
            .filter(|t| {
                t.event.component == component && t.recovery_status == RecoveryStatus::Active
            })
            .map(|t| t.event.timestamp)
            .min()?;
        Some(Utc::now() - earliest)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DegradationAlert {
    pub level: AlertLevel,
    pub component: String,
    pub message: String,
}

pub fn evaluate_alerts(tracker: &DegradationTracker) -> Vec<DegradationAlert> {
    let mut alerts = Vec::new();
    let mut seen = HashSet::new();
    for tracked in tracker.events() {
        let component = &tracked.event.component;
        if !seen.insert(component.as_str()) {
            continue;
        }
        if let Some(duration) = tracker.degraded_duration(component) {
            if duration > Duration::hours(24) {
                alerts.push(DegradationAlert {
                    level: AlertLevel::Critical,
                    component: component.clone(),
                    message: format!("{component} has been degraded for over 24 hours"),
                });
                continue;
            }
        }
        let recent = tracker.count_recent(component, 3600);
        if recent > 3 {
            alerts.push(DegradationAlert {
                level: AlertLevel::Warning,
                component: component.clone(),
                message: format!("{component} has {recent} degradation events in the last hour"),
            });
        }
    }
    alerts
}
