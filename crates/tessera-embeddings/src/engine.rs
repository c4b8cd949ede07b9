//! EmbeddingEngine: provider chain plus L1 cache. Implements `IEmbeddingProvider`.
//!
//! Only embeddings from the primary provider are cached; a fallback vector
//! lives in a different space and must not outlast the outage.

use tracing::{debug, info};

use tessera_core::config::EmbeddingConfig;
use tessera_core::errors::{EmbeddingError, TesseraResult};
use tessera_core::models::DegradationEvent;
use tessera_core::traits::IEmbeddingProvider;

use crate::cache::{cache_key, L1MemoryCache};
use crate::degradation::DegradationChain;
use crate::providers::{self, HashEmbeddingProvider};

pub struct EmbeddingEngine {
    chain: DegradationChain,
    cache: L1MemoryCache,
    config: EmbeddingConfig,
}

impl EmbeddingEngine {
    /// Configured provider first. The hash provider backs it up only when
    /// `hash_fallback` is set; otherwise a remote outage surfaces as an error.
    pub fn new(config: EmbeddingConfig) -> Self {
        let mut chain = DegradationChain::new();
        let primary = providers::create_provider(&config);
        let primary_is_hash = primary.name() == "hash";
        chain.push(primary);
        if !primary_is_hash && config.hash_fallback {
            chain.push(Box::new(HashEmbeddingProvider::new(config.dimensions)));
        }
        Self::with_chain(chain, config)
    }

    /// Build around a caller-supplied chain.
    pub fn with_chain(chain: DegradationChain, config: EmbeddingConfig) -> Self {
        let cache = L1MemoryCache::new(config.l1_cache_size);
        info!(
            provider = chain.active_provider_name(),
            dims = config.dimensions,
            "EmbeddingEngine initialized"
        );
        Self {
            chain,
            cache,
            config,
        }
    }

    fn check_dims(&self, embedding: &[f32]) -> TesseraResult<()> {
        if embedding.len() != self.config.dimensions {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.config.dimensions,
                actual: embedding.len(),
            }
            .into());
        }
        Ok(())
    }

    /// Embed through the cache.
    pub fn embed_cached(&self, text: &str) -> TesseraResult<Vec<f32>> {
        let key = cache_key(text);
        if let Some(hit) = self.cache.get(&key) {
            debug!(key = %key, "embedding cache hit");
            return Ok(hit);
        }
        let (embedding, provider) = self.chain.embed(text)?;
        self.check_dims(&embedding)?;
        debug!(provider, "embedded text");
        if provider == self.chain.primary_name() {
            self.cache.insert(key, embedding.clone());
        }
        Ok(embedding)
    }

    pub fn drain_degradation_events(&self) -> Vec<DegradationEvent> {
        self.chain.drain_events()
    }

    pub fn active_provider(&self) -> &str {
        self.chain.active_provider_name()
    }

    pub fn cache_len(&self) -> u64 {
        self.cache.len()
    }
}

impl IEmbeddingProvider for EmbeddingEngine {
    fn embed(&self, text: &str) -> TesseraResult<Vec<f32>> {
        self.embed_cached(text)
    }

    fn embed_batch(&self, texts: &[String]) -> TesseraResult<Vec<Vec<f32>>> {
        let keys: Vec<String> = texts.iter().map(|t| cache_key(t)).collect();
        let cached: Vec<Option<Vec<f32>>> = keys.iter().map(|k| self.cache.get(k)).collect();

        let misses: Vec<String> = texts
            .iter()
            .zip(&cached)
            .filter(|(_, hit)| hit.is_none())
            .map(|(t, _)| t.clone())
            .collect();
        let (fresh, cacheable) = if misses.is_empty() {
            (Vec::new(), false)
        } else {
            let (vecs, provider) = self.chain.embed_batch(&misses)?;
            for v in &vecs {
                self.check_dims(v)?;
            }
            (vecs, provider == self.chain.primary_name())
        };
        let mut fresh = fresh.into_iter();

        let mut out = Vec::with_capacity(texts.len());
        for (key, hit) in keys.into_iter().zip(cached) {
            match hit {
                Some(v) => out.push(v),
                None => {
                    let v = fresh.next().ok_or_else(|| EmbeddingError::InferenceFailed {
                        reason: "provider returned fewer embeddings than requested".to_string(),
                    })?;
                    if cacheable {
                        self.cache.insert(key, v.clone());
                    }
                    out.push(v);
                }
            }
        }
        Ok(out)
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn name(&self) -> &str {
        self.chain.active_provider_name()
    }

    fn is_available(&self) -> bool {
        self.chain.active_provider_name() != "none"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> EmbeddingEngine {
        EmbeddingEngine::new(EmbeddingConfig {
            provider: "hash".to_string(),
            dimensions: 64,
            ..Default::default()
        })
    }

    #[test]
    fn embed_has_configured_dims() {
        let e = engine();
        assert_eq!(e.embed("harbor fog").unwrap().len(), 64);
        assert_eq!(e.active_provider(), "hash");
    }

    #[test]
    fn repeated_embed_is_cached() {
        let e = engine();
        let a = e.embed("harbor fog").unwrap();
        let b = e.embed("harbor fog").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn batch_mixes_hits_and_misses_in_order() {
        let e = engine();
        let warm = e.embed("second").unwrap();
        let texts = vec!["first".to_string(), "second".to_string(), "third".to_string()];
        let out = e.embed_batch(&texts).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[1], warm);
        assert_eq!(out[0], e.embed("first").unwrap());
    }

    #[test]
    fn no_degradation_on_success() {
        let e = engine();
        e.embed("x").unwrap();
        assert!(e.drain_degradation_events().is_empty());
    }
}
