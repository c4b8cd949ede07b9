//! Dense Reranker: cosine similarity blended with structural importance.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use tessera_core::config::RerankConfig;
use tessera_core::fragment::{clamp_unit, Fragment};
use tessera_core::vector::cosine_similarity;

/// A fragment with its combined dense score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredFragment {
    pub fragment: Fragment,
    pub score: f64,
}

/// `score = w_sim × cos(q, f) + w_imp × min(1, importance / upper_bound)`.
pub struct DenseReranker {
    config: RerankConfig,
}

impl DenseReranker {
    pub fn new(config: RerankConfig) -> Self {
        Self { config }
    }

    pub fn top_n(&self) -> usize {
        self.config.top_n
    }

    /// Importance mapped into [0, 1].
    pub fn normalized_importance(&self, importance: f64) -> f64 {
        if self.config.weight_upper_bound <= 0.0 {
            return 0.0;
        }
        clamp_unit(importance / self.config.weight_upper_bound)
    }

    /// Combined score, or `None` when dimensionalities differ.
    pub fn score(&self, query: &[f32], fragment: &Fragment) -> Option<f64> {
        if fragment.embedding.len() != query.len() {
            return None;
        }
        let sim = cosine_similarity(query, &fragment.embedding);
        Some(
            self.config.similarity_weight * sim
                + self.config.importance_weight
                    * self.normalized_importance(fragment.importance_weight),
        )
    }

    /// Score every candidate in parallel, sort descending (ties keep
    /// candidate order), keep the top `top_n`.
    pub fn rerank(&self, query: &[f32], candidates: Vec<Fragment>) -> Vec<ScoredFragment> {
        let total = candidates.len();
        let scored: Vec<Option<ScoredFragment>> = candidates
            .into_par_iter()
            .map(|fragment| {
                self.score(query, &fragment)
                    .map(|score| ScoredFragment { fragment, score })
            })
            .collect();

        let mut kept: Vec<ScoredFragment> = scored.into_iter().flatten().collect();
        if kept.len() < total {
            warn!(
                skipped = total - kept.len(),
                expected_dims = query.len(),
                "skipped candidates with mismatched embedding dimensions"
            );
        }
        kept.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        kept.truncate(self.config.top_n);
        debug!(candidates = total, kept = kept.len(), "dense rerank");
        kept
    }
}

impl Default for DenseReranker {
    fn default() -> Self {
        Self::new(RerankConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::fragment::Provenance;

    fn frag(embedding: Vec<f32>, importance: f64) -> Fragment {
        Fragment::new("x", embedding, importance, vec![], Provenance::Authored)
    }

    #[test]
    fn combined_score_formula() {
        let r = DenseReranker::default();
        let s = r.score(&[1.0, 0.0], &frag(vec![1.0, 0.0], 1.0)).unwrap();
        assert!((s - (0.7 + 0.3 * 0.5)).abs() < 1e-12);
        // Importance beyond the bound saturates.
        let s = r.score(&[1.0, 0.0], &frag(vec![0.0, 1.0], 5.0)).unwrap();
        assert!((s - 0.3).abs() < 1e-12);
    }

    #[test]
    fn importance_breaks_similarity_ties() {
        let r = DenseReranker::default();
        let low = frag(vec![1.0, 0.0], 0.5);
        let high = frag(vec![1.0, 0.0], 2.0);
        let out = r.rerank(&[1.0, 0.0], vec![low, high.clone()]);
        assert_eq!(out[0].fragment.id, high.id);
    }

    #[test]
    fn mismatched_dims_are_skipped_and_top_n_applies() {
        let r = DenseReranker::new(RerankConfig {
            top_n: 2,
            ..Default::default()
        });
        let candidates = vec![
            frag(vec![1.0, 0.0], 1.0),
            frag(vec![1.0, 0.0, 0.0], 1.0),
            frag(vec![0.5, 0.5], 1.0),
            frag(vec![0.0, 1.0], 1.0),
        ];
        let out = r.rerank(&[1.0, 0.0], candidates);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|s| s.fragment.dimensions() == 2));
        assert!(out[0].score >= out[1].score);
    }
}
