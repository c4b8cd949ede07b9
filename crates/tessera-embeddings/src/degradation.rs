//! Provider fallback chain.
//!
//! Tries providers in order, skipping unavailable ones. Every fallback past
//! the primary is recorded as a `DegradationEvent`; undrained events are
//! capped, oldest dropped first.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::Utc;
use tracing::warn;

use tessera_core::errors::{EmbeddingError, TesseraResult};
use tessera_core::models::DegradationEvent;
use tessera_core::traits::IEmbeddingProvider;

/// Undrained fallback events kept at most.
pub const MAX_PENDING_EVENTS: usize = 1_000;

pub struct DegradationChain {
    chain: Vec<Box<dyn IEmbeddingProvider>>,
    events: Mutex<VecDeque<DegradationEvent>>,
}

impl Default for DegradationChain {
    fn default() -> Self {
        Self::new()
    }
}

impl DegradationChain {
    pub fn new() -> Self {
        Self {
            chain: Vec::new(),
            events: Mutex::new(VecDeque::new()),
        }
    }

    /// Add a provider at the lowest priority.
    pub fn push(&mut self, provider: Box<dyn IEmbeddingProvider>) {
        self.chain.push(provider);
    }

    fn record_fallback(&self, used: &str) {
        let primary = self.chain.first().map(|p| p.name()).unwrap_or("unknown");
        if let Ok(mut events) = self.events.lock() {
            if events.len() >= MAX_PENDING_EVENTS {
                events.pop_front();
            }
            events.push_back(DegradationEvent {
                component: "embeddings".to_string(),
                failure: format!("{primary} unavailable"),
                fallback_used: used.to_string(),
                timestamp: Utc::now(),
            });
        }
    }

    fn run<T>(
        &self,
        op: &str,
        f: impl Fn(&dyn IEmbeddingProvider) -> TesseraResult<T>,
    ) -> TesseraResult<(T, &str)> {
        let mut last_error = None;
        for (i, provider) in self.chain.iter().enumerate() {
            if !provider.is_available() {
                continue;
            }
            match f(provider.as_ref()) {
                Ok(out) => {
                    if i > 0 {
                        self.record_fallback(provider.name());
                    }
                    return Ok((out, provider.name()));
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        op,
                        error = %e,
                        "provider failed, trying next in chain"
                    );
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| {
            EmbeddingError::ProviderUnavailable {
                provider: "all providers exhausted".to_string(),
            }
            .into()
        }))
    }

    /// Embed with the first provider that succeeds; returns its name too.
    pub fn embed(&self, text: &str) -> TesseraResult<(Vec<f32>, &str)> {
        self.run("embed", |p| p.embed(text))
    }

    pub fn embed_batch(&self, texts: &[String]) -> TesseraResult<(Vec<Vec<f32>>, &str)> {
        self.run("embed_batch", |p| p.embed_batch(texts))
    }

    /// Name of the highest-priority provider, available or not.
    pub fn primary_name(&self) -> &str {
        self.chain.first().map(|p| p.name()).unwrap_or("none")
    }

    /// First available provider.
    pub fn active_provider_name(&self) -> &str {
        self.chain
            .iter()
            .find(|p| p.is_available())
            .map(|p| p.name())
            .unwrap_or("none")
    }

    pub fn drain_events(&self) -> Vec<DegradationEvent> {
        self.events
            .lock()
            .map(|mut events| events.drain(..).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingProvider;
    impl IEmbeddingProvider for FailingProvider {
        fn embed(&self, _text: &str) -> TesseraResult<Vec<f32>> {
            Err(EmbeddingError::InferenceFailed {
                reason: "mock failure".to_string(),
            }
            .into())
        }
        fn dimensions(&self) -> usize {
            4
        }
        fn name(&self) -> &str {
            "failing-mock"
        }
        fn is_available(&self) -> bool {
            true
        }
    }

    struct FixedProvider(&'static str);
    impl IEmbeddingProvider for FixedProvider {
        fn embed(&self, _text: &str) -> TesseraResult<Vec<f32>> {
            Ok(vec![1.0; 4])
        }
        fn dimensions(&self) -> usize {
            4
        }
        fn name(&self) -> &str {
            self.0
        }
        fn is_available(&self) -> bool {
            true
        }
    }

    #[test]
    fn primary_succeeds_no_degradation() {
        let mut chain = DegradationChain::new();
        chain.push(Box::new(FixedProvider("primary")));
        chain.push(Box::new(FixedProvider("fallback")));
        let (_, name) = chain.embed("x").unwrap();
        assert_eq!(name, "primary");
        assert!(chain.drain_events().is_empty());
    }

    #[test]
    fn fallback_is_recorded() {
        let mut chain = DegradationChain::new();
        chain.push(Box::new(FailingProvider));
        chain.push(Box::new(FixedProvider("fallback")));
        let (_, name) = chain.embed_batch(&["a".to_string()]).unwrap();
        assert_eq!(name, "fallback");
        let events = chain.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].failure, "failing-mock unavailable");
        assert!(chain.drain_events().is_empty());
    }

    #[test]
    fn pending_events_are_capped() {
        let mut chain = DegradationChain::new();
        chain.push(Box::new(FailingProvider));
        chain.push(Box::new(FixedProvider("fallback")));
        for _ in 0..MAX_PENDING_EVENTS + 25 {
            chain.embed("x").unwrap();
        }
        assert_eq!(chain.drain_events().len(), MAX_PENDING_EVENTS);
        assert!(chain.drain_events().is_empty());
    }

    #[test]
    fn all_fail_returns_last_error() {
        let mut chain = DegradationChain::new();
        chain.push(Box::new(FailingProvider));
        assert!(chain.embed("x").is_err());
        assert!(DegradationChain::new().embed("x").is_err());
    }
}
