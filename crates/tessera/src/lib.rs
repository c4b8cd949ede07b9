//! # tessera
//!
//! Adaptive hybrid retrieval: keyword activation narrows the corpus, dense
//! similarity ranks the candidates, and a per-cluster bandit learns from
//! feedback which fragments actually help.
//!
//! [`TesseraRuntime`] owns every engine and is the intended entry point.

pub mod runtime;

pub use runtime::{RuntimeOptions, TesseraRuntime};

pub use tessera_core::config::TesseraConfig;
pub use tessera_core::errors::{TesseraError, TesseraResult};
pub use tessera_core::models::{
    FeedbackAck, FeedbackEvent, FeedbackOutcome, HumanSignal, SelectionRequest, SelectionResult,
};
pub use tessera_learning::{QueueStats, ShutdownMode};
pub use tessera_observability::{HealthReport, HealthStatus};
