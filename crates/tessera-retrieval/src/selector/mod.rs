//! Adaptive Selector: ε-greedy choice between a random permutation and a
//! UCB ranking over per-cluster learned values.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};
use tracing::debug;

use tessera_core::config::SelectorConfig;
use tessera_core::errors::{RetrievalError, TesseraError, TesseraResult};
use tessera_core::fragment::{ClusterId, ValueEntry};
use tessera_core::models::{SelectedFragment, SelectionMode};
use tessera_core::traits::IValueStore;

use crate::dense::ScoredFragment;

/// UCB score: `value + c·sqrt(ln(total + 1) / visits)`, where `total` counts
/// every visit in the cluster. Unvisited → +∞.
pub fn ucb_score(entry: ValueEntry, total_visits: u64, c: f64) -> f64 {
    if entry.visits == 0 {
        return f64::INFINITY;
    }
    let bonus = ((total_visits as f64 + 1.0).ln() / entry.visits as f64).sqrt();
    entry.value + c * bonus
}

pub struct AdaptiveSelector {
    config: SelectorConfig,
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl AdaptiveSelector {
    /// Selector with an entropy-seeded RNG.
    pub fn new(config: SelectorConfig) -> Self {
        Self::with_rng(config, Box::new(StdRng::from_entropy()))
    }

    /// Selector with a caller-supplied random source.
    pub fn with_rng(config: SelectorConfig, rng: Box<dyn RngCore + Send>) -> Self {
        Self {
            config,
            rng: Mutex::new(rng),
        }
    }

    /// Deterministic selector for tests and replays.
    pub fn seeded(config: SelectorConfig, seed: u64) -> Self {
        Self::with_rng(config, Box::new(StdRng::seed_from_u64(seed)))
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    fn rng_poisoned() -> TesseraError {
        RetrievalError::LockPoisoned {
            component: "selector rng".to_string(),
        }
        .into()
    }

    /// Draw the mode for one selection.
    fn draw_mode(&self) -> TesseraResult<SelectionMode> {
        let mut rng = self.rng.lock().map_err(|_| Self::rng_poisoned())?;
        let roll: f64 = rng.gen();
        Ok(if roll < self.config.exploration_rate {
            SelectionMode::Explore
        } else {
            SelectionMode::Exploit
        })
    }

    /// Pick `top_k` of the reranked candidates for `cluster`.
    pub fn select(
        &self,
        cluster: ClusterId,
        candidates: Vec<ScoredFragment>,
        values: &dyn IValueStore,
        top_k: usize,
    ) -> TesseraResult<Vec<SelectedFragment>> {
        let mode = self.draw_mode()?;
        self.select_with_mode(mode, cluster, candidates, values, top_k)
    }

    /// Same as [`select`](Self::select) with the mode fixed by the caller.
    pub fn select_with_mode(
        &self,
        mode: SelectionMode,
        cluster: ClusterId,
        candidates: Vec<ScoredFragment>,
        values: &dyn IValueStore,
        top_k: usize,
    ) -> TesseraResult<Vec<SelectedFragment>> {
        if candidates.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = candidates.iter().map(|c| c.fragment.id.clone()).collect();
        let entries = values
            .get_many(&ids, cluster)
            .map_err(|e| RetrievalError::Unavailable {
                reason: format!("value store: {e}"),
            })?;

        let mut rows: Vec<(ScoredFragment, ValueEntry, f64)> = match mode {
            SelectionMode::Explore => {
                let mut rows: Vec<_> = candidates
                    .into_iter()
                    .zip(entries)
                    .map(|(c, e)| (c, e, 0.0))
                    .collect();
                let mut rng = self.rng.lock().map_err(|_| Self::rng_poisoned())?;
                rows.shuffle(&mut *rng);
                rows
            }
            SelectionMode::Exploit => {
                let total = values
                    .cluster_visits(cluster)
                    .map_err(|e| RetrievalError::Unavailable {
                        reason: format!("value store: {e}"),
                    })?;
                let c = self.config.ucb_constant;
                let mut rows: Vec<_> = candidates
                    .into_iter()
                    .zip(entries)
                    .map(|(cand, e)| {
                        let u = ucb_score(e, total, c);
                        (cand, e, u)
                    })
                    .collect();
                // Stable: equal scores (including +∞) keep rerank order.
                rows.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));
                rows
            }
        };
        rows.truncate(top_k);

        debug!(?mode, cluster, picks = rows.len(), "selection");
        Ok(rows
            .into_iter()
            .map(|(cand, entry, _)| SelectedFragment {
                fragment: cand.fragment,
                cluster_id: cluster,
                value: entry.value,
                visits: entry.visits,
                mode,
                rerank_score: cand.score,
            })
            .collect())
    }

    /// Fold a reward into one (fragment, cluster) value with the configured α.
    pub fn update_value(
        &self,
        values: &dyn IValueStore,
        fragment_id: &str,
        cluster: ClusterId,
        reward: f64,
    ) -> TesseraResult<ValueEntry> {
        values.update(fragment_id, cluster, reward, self.config.learning_rate)
    }
}

impl Default for AdaptiveSelector {
    fn default() -> Self {
        Self::new(SelectorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unvisited_is_infinite() {
        assert_eq!(
            ucb_score(ValueEntry::optimistic_default(), 10, 1.4),
            f64::INFINITY
        );
    }

    #[test]
    fn bonus_shrinks_with_visits() {
        let few = ucb_score(ValueEntry { value: 0.5, visits: 1 }, 20, 1.0);
        let many = ucb_score(ValueEntry { value: 0.5, visits: 10 }, 20, 1.0);
        assert!(few > many);
        assert!(many > 0.5);
    }

    #[test]
    fn zero_constant_is_pure_value() {
        let e = ValueEntry { value: 0.7, visits: 3 };
        assert_eq!(ucb_score(e, 9, 0.0), 0.7);
    }
}
