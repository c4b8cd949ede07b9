//! # tessera-storage
//!
//! Segment Store and value stores.
//!
//! - [`StorageEngine`]: SQLite (single writer + read pool), implements both
//!   `ISegmentStore` and `IValueStore`.
//! - [`InMemoryValueStore`]: dashmap-backed value store with per-key atomic updates.

pub mod engine;
pub mod memory_values;
pub mod pool;
pub mod queries;
pub mod schema;

pub use engine::StorageEngine;
pub use memory_values::InMemoryValueStore;

use tessera_core::errors::{StorageError, TesseraError};

/// Wrap a SQLite failure message into the workspace error.
pub(crate) fn to_storage_err(message: impl Into<String>) -> TesseraError {
    StorageError::SqliteError {
        message: message.into(),
    }
    .into()
}
