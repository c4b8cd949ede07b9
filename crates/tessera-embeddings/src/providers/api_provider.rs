//! HTTP embedding provider.
//!
//! Talks to an OpenAI-compatible `/embeddings` endpoint. Bounded retries with
//! exponential backoff; after retries are exhausted the provider reports
//! itself unavailable for a cool-down, then is tried again.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use tessera_core::config::EmbeddingConfig;
use tessera_core::errors::{EmbeddingError, TesseraResult};
use tessera_core::traits::IEmbeddingProvider;

use crate::http::HttpTarget;

const DEFAULT_MODEL: &str = "text-embedding-3-small";

pub struct ApiProvider {
    target: HttpTarget,
    model: String,
    dimensions: usize,
    cooldown: Duration,
    unavailable_until: Mutex<Option<Instant>>,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Deserialize)]
struct EmbedData {
    embedding: Vec<f32>,
}

impl ApiProvider {
    /// Build from config. `None` when no endpoint is configured.
    /// The key is read from the environment variable named by `api_key_env`.
    pub fn from_config(config: &EmbeddingConfig) -> Option<Self> {
        let endpoint = config.endpoint.clone()?;
        let api_key = config
            .api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok());
        Some(Self {
            target: HttpTarget {
                endpoint,
                api_key,
                max_retries: config.max_retries,
                backoff_ms: config.backoff_ms,
                timeout: Duration::from_secs(config.timeout_secs),
            },
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            dimensions: config.dimensions,
            cooldown: Duration::from_secs(config.retry_cooldown_secs),
            unavailable_until: Mutex::new(None),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.target.endpoint
    }

    fn request_embeddings(&self, texts: &[String]) -> TesseraResult<Vec<Vec<f32>>> {
        if !self.is_available() {
            return Err(EmbeddingError::ProviderUnavailable {
                provider: self.name().to_string(),
            }
            .into());
        }

        let request = EmbedRequest {
            model: &self.model,
            input: texts,
        };
        let response: EmbedResponse = match self.target.post_json(&request) {
            Ok(r) => r,
            Err(reason) => {
                self.set_unavailable_until(Some(Instant::now() + self.cooldown));
                return Err(EmbeddingError::InferenceFailed { reason }.into());
            }
        };
        self.set_unavailable_until(None);

        let embeddings: Vec<Vec<f32>> = response.data.into_iter().map(|d| d.embedding).collect();
        if embeddings.len() != texts.len() {
            return Err(EmbeddingError::InferenceFailed {
                reason: format!(
                    "requested {} embeddings, received {}",
                    texts.len(),
                    embeddings.len()
                ),
            }
            .into());
        }
        if let Some(bad) = embeddings.iter().find(|e| e.len() != self.dimensions) {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimensions,
                actual: bad.len(),
            }
            .into());
        }
        Ok(embeddings)
    }

    fn set_unavailable_until(&self, until: Option<Instant>) {
        *self
            .unavailable_until
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = until;
    }

    /// Re-enable the provider before its cool-down ends.
    pub fn reset_availability(&self) {
        self.set_unavailable_until(None);
    }
}

impl IEmbeddingProvider for ApiProvider {
    fn embed(&self, text: &str) -> TesseraResult<Vec<f32>> {
        let results = self.request_embeddings(&[text.to_string()])?;
        results.into_iter().next().ok_or_else(|| {
            EmbeddingError::InferenceFailed {
                reason: "empty response".to_string(),
            }
            .into()
        })
    }

    fn embed_batch(&self, texts: &[String]) -> TesseraResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        self.request_embeddings(texts)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "api"
    }

    fn is_available(&self) -> bool {
        let until = *self
            .unavailable_until
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        until.map_or(true, |t| Instant::now() >= t)
    }
}
