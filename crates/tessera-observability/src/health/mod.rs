//! Health reporting: a [`HealthSnapshot`] of raw facts in, a [`HealthReport`]
//! with per-subsystem statuses out.

pub mod reporter;

pub use reporter::{HealthReport, HealthReporter, HealthSnapshot, HealthStatus, SubsystemHealth};
