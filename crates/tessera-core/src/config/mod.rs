pub mod defaults;
mod embedding_config;
mod feedback_config;
mod observability_config;
mod quantizer_config;
mod retrieval_config;
mod selector_config;
mod storage_config;

pub use embedding_config::EmbeddingConfig;
pub use feedback_config::FeedbackConfig;
pub use observability_config::ObservabilityConfig;
pub use quantizer_config::QuantizerConfig;
pub use retrieval_config::{IngestionConfig, RerankConfig, SparseConfig};
pub use selector_config::SelectorConfig;
pub use storage_config::StorageConfig;

use serde::{Deserialize, Serialize};

use crate::errors::{TesseraError, TesseraResult};

/// Top-level configuration. Every section falls back to its defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TesseraConfig {
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    pub sparse: SparseConfig,
    pub rerank: RerankConfig,
    pub quantizer: QuantizerConfig,
    pub selector: SelectorConfig,
    pub feedback: FeedbackConfig,
    pub ingestion: IngestionConfig,
    pub observability: ObservabilityConfig,
}

impl TesseraConfig {
    /// Parse a TOML document and validate it.
    pub fn from_toml(toml_str: &str) -> TesseraResult<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| TesseraError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize back to TOML.
    pub fn to_toml(&self) -> TesseraResult<String> {
        toml::to_string_pretty(self).map_err(|e| TesseraError::ConfigError(e.to_string()))
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> TesseraResult<()> {
        let unit = |name: &str, v: f64| -> TesseraResult<()> {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(TesseraError::ConfigError(format!(
                    "{name} must be within [0, 1], got {v}"
                )))
            }
        };

        unit("selector.exploration_rate", self.selector.exploration_rate)?;
        unit("selector.learning_rate", self.selector.learning_rate)?;
        unit("feedback.high_quality_threshold", self.feedback.high_quality_threshold)?;
        unit(
            "feedback.medium_quality_threshold",
            self.feedback.medium_quality_threshold,
        )?;

        if self.feedback.medium_quality_threshold > self.feedback.high_quality_threshold {
            return Err(TesseraError::ConfigError(
                "feedback.medium_quality_threshold exceeds high_quality_threshold".to_string(),
            ));
        }
        if self.selector.ucb_constant < 0.0 {
            return Err(TesseraError::ConfigError(
                "selector.ucb_constant must be non-negative".to_string(),
            ));
        }
        if self.quantizer.clusters == 0 {
            return Err(TesseraError::ConfigError(
                "quantizer.clusters must be at least 1".to_string(),
            ));
        }
        if self.embedding.dimensions == 0 {
            return Err(TesseraError::ConfigError(
                "embedding.dimensions must be at least 1".to_string(),
            ));
        }
        if self.rerank.weight_upper_bound <= 0.0 {
            return Err(TesseraError::ConfigError(
                "rerank.weight_upper_bound must be positive".to_string(),
            ));
        }
        if self.feedback.queue_capacity == 0 {
            return Err(TesseraError::ConfigError(
                "feedback.queue_capacity must be at least 1".to_string(),
            ));
        }
        if self.feedback.event_timeout_secs == 0 {
            return Err(TesseraError::ConfigError(
                "feedback.event_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
