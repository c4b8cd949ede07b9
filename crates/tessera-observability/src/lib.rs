//! # tessera-observability
//!
//! JSON tracing setup and span macros, lock-free selection and feedback
//! counters, degradation tracking with alerting, and health reports built
//! from a [`HealthSnapshot`].

pub mod degradation;
pub mod engine;
pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use engine::ObservabilityEngine;
pub use health::{HealthReport, HealthReporter, HealthSnapshot, HealthStatus, SubsystemHealth};
pub use metrics::{FeedbackMetrics, MetricsCollector, MetricsSnapshot, SelectionMetrics};
pub use tracing_setup::{init_tracing, init_tracing_with_filter};
