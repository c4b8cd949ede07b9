//! # tessera-retrieval
//!
//! The selection pipeline:
//!
//! ```text
//! query text ──► SparseActivator ──► candidate ids ─┐
//!                                                   ├─► DenseReranker ─► AdaptiveSelector ─► picks
//! query embedding ─► (no keyword hit) global search ┘          ▲
//!        └─────────► QueryQuantizer ─► cluster id ──────────────┘
//! ```
//!
//! plus the [`IngestionPipeline`] that turns source text into fragments.

pub mod dense;
pub mod engine;
pub mod ingestion;
pub mod quantizer;
pub mod selector;
pub mod sparse;

pub use dense::{DenseReranker, ScoredFragment};
pub use engine::RetrievalEngine;
pub use ingestion::IngestionPipeline;
pub use quantizer::{ClusterSpace, QueryQuantizer};
pub use selector::AdaptiveSelector;
pub use sparse::{InvertedIndex, SparseActivator};
