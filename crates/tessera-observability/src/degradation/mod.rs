//! Degradation tracking and alerting.

pub mod tracker;

pub use tracker::{
    evaluate_alerts, AlertLevel, DegradationAlert, DegradationTracker, RecoveryStatus,
};
