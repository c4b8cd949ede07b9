//! Provider registry.
//!
//! - `api`: remote embedding endpoint (requires `embedding.endpoint`)
//! - `hash`: deterministic pseudo-vectors, always available

pub mod api_provider;
pub mod hash_provider;

pub use api_provider::ApiProvider;
pub use hash_provider::HashEmbeddingProvider;

use tessera_core::config::EmbeddingConfig;
use tessera_core::traits::IEmbeddingProvider;
use tracing::{info, warn};

/// Create the configured provider, falling back to the hash provider when
/// the configured one cannot be built.
pub fn create_provider(config: &EmbeddingConfig) -> Box<dyn IEmbeddingProvider> {
    match config.provider.as_str() {
        "api" => match ApiProvider::from_config(config) {
            Some(p) => {
                info!(provider = "api", endpoint = p.endpoint(), "embedding provider configured");
                Box::new(p)
            }
            None => {
                warn!("api provider configured without an endpoint; using hash provider");
                Box::new(HashEmbeddingProvider::new(config.dimensions))
            }
        },
        "hash" => {
            info!(provider = "hash", "using hash embedding provider");
            Box::new(HashEmbeddingProvider::new(config.dimensions))
        }
        other => {
            warn!(provider = other, "unknown provider, using hash provider");
            Box::new(HashEmbeddingProvider::new(config.dimensions))
        }
    }
}
