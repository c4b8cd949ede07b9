//! # tessera-embeddings
//!
//! Embedding generation and generation-quality scoring.
//!
//! ```text
//! EmbeddingEngine
//! ├── DegradationChain (provider fallback)
//! │   ├── ApiProvider (HTTP, retries with backoff)
//! │   └── HashEmbeddingProvider (deterministic, always available)
//! └── L1MemoryCache (moka, keyed by blake3 of the text)
//!
//! Scoring: ApiScoringOracle (HTTP) | NoOpOracle
//! ```

pub mod cache;
pub mod degradation;
pub mod engine;
mod http;
pub mod providers;
pub mod scoring;

pub use cache::L1MemoryCache;
pub use degradation::DegradationChain;
pub use engine::EmbeddingEngine;
pub use providers::{create_provider, ApiProvider, HashEmbeddingProvider};
pub use scoring::{create_oracle, ApiScoringOracle, NoOpOracle};
