use serde::{Deserialize, Serialize};

use super::defaults;

/// Sparse activation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SparseConfig {
    /// Maximum number of candidates handed to the dense reranker.
    pub max_candidates: usize,
    /// Shortest token kept as a keyword.
    pub min_keyword_chars: usize,
}

impl Default for SparseConfig {
    fn default() -> Self {
        Self {
            max_candidates: defaults::DEFAULT_SPARSE_CANDIDATES,
            min_keyword_chars: defaults::DEFAULT_MIN_KEYWORD_CHARS,
        }
    }
}

/// Dense reranking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankConfig {
    /// Length of the reranked short-list.
    pub top_n: usize,
    /// Weight of cosine similarity in the combined score.
    pub similarity_weight: f64,
    /// Weight of normalized importance in the combined score.
    pub importance_weight: f64,
    /// Importance weight that normalizes to 1.0.
    pub weight_upper_bound: f64,
    /// Minimum cosine similarity for the global-search fallback.
    pub fallback_threshold: f64,
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            top_n: defaults::DEFAULT_RERANK_TOP_N,
            similarity_weight: defaults::DEFAULT_SIMILARITY_WEIGHT,
            importance_weight: defaults::DEFAULT_IMPORTANCE_WEIGHT,
            weight_upper_bound: defaults::DEFAULT_WEIGHT_UPPER_BOUND,
            fallback_threshold: defaults::DEFAULT_FALLBACK_THRESHOLD,
        }
    }
}

/// Ingestion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    /// Extra importance for the first paragraph after a chapter heading.
    pub chapter_boost: f64,
    /// Extra importance for a paragraph whose tone departs from the previous one.
    pub tonal_shift_boost: f64,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            chapter_boost: defaults::DEFAULT_CHAPTER_BOOST,
            tonal_shift_boost: defaults::DEFAULT_TONAL_SHIFT_BOOST,
        }
    }
}
