//! Generation-quality oracles.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use tessera_core::config::EmbeddingConfig;
use tessera_core::constants::DEFAULT_AUTOMATIC_SCORE;
use tessera_core::errors::{EmbeddingError, TesseraResult};
use tessera_core::fragment::clamp_unit;
use tessera_core::traits::IScoringOracle;

use crate::http::HttpTarget;

/// Oracle used when no scoring endpoint is configured. Always returns the
/// neutral automatic score.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpOracle;

impl IScoringOracle for NoOpOracle {
    fn score(&self, _generated_text: &str, _context: &[String]) -> TesseraResult<f64> {
        Ok(DEFAULT_AUTOMATIC_SCORE)
    }

    fn name(&self) -> &str {
        "noop"
    }
}

/// Posts `{ "text", "context" }` to the scoring endpoint and expects
/// `{ "score": f64 }` back. Scores are clamped to [0, 1].
pub struct ApiScoringOracle {
    target: HttpTarget,
}

#[derive(Serialize)]
struct ScoreRequest<'a> {
    text: &'a str,
    context: &'a [String],
}

#[derive(Deserialize)]
struct ScoreResponse {
    score: f64,
}

impl ApiScoringOracle {
    pub fn new(endpoint: String, config: &EmbeddingConfig) -> Self {
        Self {
            target: HttpTarget {
                endpoint,
                api_key: config
                    .api_key_env
                    .as_deref()
                    .and_then(|var| std::env::var(var).ok()),
                max_retries: config.max_retries,
                backoff_ms: config.backoff_ms,
                timeout: Duration::from_secs(config.timeout_secs),
            },
        }
    }
}

impl IScoringOracle for ApiScoringOracle {
    fn score(&self, generated_text: &str, context: &[String]) -> TesseraResult<f64> {
        let response: ScoreResponse = self
            .target
            .post_json(&ScoreRequest {
                text: generated_text,
                context,
            })
            .map_err(|reason| EmbeddingError::ScoringFailed { reason })?;
        if !response.score.is_finite() {
            return Err(EmbeddingError::ScoringFailed {
                reason: format!("non-finite score {}", response.score),
            }
            .into());
        }
        Ok(clamp_unit(response.score))
    }

    fn name(&self) -> &str {
        "api"
    }
}

/// HTTP oracle when `scoring_endpoint` is set, otherwise [`NoOpOracle`].
pub fn create_oracle(config: &EmbeddingConfig) -> Arc<dyn IScoringOracle> {
    match &config.scoring_endpoint {
        Some(endpoint) => {
            info!(endpoint = %endpoint, "scoring oracle configured");
            Arc::new(ApiScoringOracle::new(endpoint.clone(), config))
        }
        None => Arc::new(NoOpOracle),
    }
}
