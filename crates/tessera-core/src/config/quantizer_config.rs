use serde::{Deserialize, Serialize};

use super::defaults;

/// Query space quantizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantizerConfig {
    /// Number of clusters K.
    pub clusters: usize,
    /// k-means iteration cap.
    pub max_iterations: usize,
    /// Stop once no centroid moves further than this.
    pub tolerance: f64,
    /// Number of stored embeddings sampled for a fit.
    pub sample_size: usize,
    /// Seed for k-means++ initialisation.
    pub seed: u64,
}

impl Default for QuantizerConfig {
    fn default() -> Self {
        Self {
            clusters: defaults::DEFAULT_CLUSTER_COUNT,
            max_iterations: defaults::DEFAULT_KMEANS_MAX_ITERATIONS,
            tolerance: defaults::DEFAULT_KMEANS_TOLERANCE,
            sample_size: defaults::DEFAULT_FIT_SAMPLE_SIZE,
            seed: defaults::DEFAULT_KMEANS_SEED,
        }
    }
}
