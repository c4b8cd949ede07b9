use serde::{Deserialize, Serialize};

use super::defaults;

/// Embedding and scoring provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding provider: "api" or "hash".
    pub provider: String,
    /// Embedding endpoint for the "api" provider.
    pub endpoint: Option<String>,
    /// Model name sent to the embedding endpoint.
    pub model: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: Option<String>,
    /// Embedding dimensionality D. Every stored fragment must match it.
    pub dimensions: usize,
    /// L1 in-memory cache max entries.
    pub l1_cache_size: u64,
    /// Bounded retry attempts for remote providers.
    pub max_retries: u32,
    /// Base delay of the exponential backoff.
    pub backoff_ms: u64,
    /// HTTP request timeout.
    pub timeout_secs: u64,
    /// How long a remote provider that exhausted its retries is skipped
    /// before it is tried again.
    pub retry_cooldown_secs: u64,
    /// Serve hash pseudo-vectors when the "api" provider is down. Those
    /// vectors do not share the API's embedding space; off in production.
    pub hash_fallback: bool,
    /// Scoring oracle endpoint. `None` disables automatic scoring.
    pub scoring_endpoint: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: defaults::DEFAULT_EMBEDDING_PROVIDER.to_string(),
            endpoint: None,
            model: None,
            api_key_env: None,
            dimensions: defaults::DEFAULT_EMBEDDING_DIMENSIONS,
            l1_cache_size: defaults::DEFAULT_L1_CACHE_SIZE,
            max_retries: defaults::DEFAULT_PROVIDER_MAX_RETRIES,
            backoff_ms: defaults::DEFAULT_PROVIDER_BACKOFF_MS,
            timeout_secs: defaults::DEFAULT_PROVIDER_TIMEOUT_SECS,
            retry_cooldown_secs: defaults::DEFAULT_PROVIDER_COOLDOWN_SECS,
            hash_fallback: defaults::DEFAULT_HASH_FALLBACK,
            scoring_endpoint: None,
        }
    }
}
