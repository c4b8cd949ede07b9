use serde::{Deserialize, Serialize};

use super::defaults;

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level used when `TESSERA_LOG` is unset.
    pub log_level: String,
    /// Install the JSON tracing subscriber at runtime start-up.
    pub tracing_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::DEFAULT_LOG_LEVEL.to_string(),
            tracing_enabled: defaults::DEFAULT_TRACING_ENABLED,
        }
    }
}
