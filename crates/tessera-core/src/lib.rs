//! # tessera-core
//!
//! Foundation crate for the Tessera retrieval engine.
//! Defines fragments, learned-value entries, selection and feedback models,
//! the store/provider traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod fragment;
pub mod models;
pub mod text;
pub mod traits;
pub mod vector;

// Re-export the most commonly used types at the crate root.
pub use config::TesseraConfig;
pub use errors::{TesseraError, TesseraResult};
pub use fragment::{ClusterId, Fragment, Provenance, ValueEntry};
pub use models::{FeedbackEvent, HumanSignal, SelectionRequest, SelectionResult};
