//! ReinforcementLoop: one feedback event → reward → value updates → optional
//! re-ingestion of the generated text.
//!
//! Nothing here returns an error to the caller. Every failure is logged with
//! `warn!` and reflected in the [`FeedbackOutcome`].

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use tessera_core::config::FeedbackConfig;
use tessera_core::constants::{
    DEFAULT_AUTOMATIC_SCORE, DEFAULT_CLUSTER, DEFAULT_VALUE, GENERATED_IMPORTANCE_WEIGHT,
};
use tessera_core::errors::{FeedbackError, TesseraError, TesseraResult};
use tessera_core::fragment::{ClusterId, Fragment, Provenance};
use tessera_core::models::{FeedbackEvent, FeedbackOutcome, StorageAction};
use tessera_core::text::extract_keywords;
use tessera_core::traits::{
    IEmbeddingProvider, IFeedbackProcessor, IScoringOracle, ISegmentStore, IValueStore,
};
use tessera_core::TesseraConfig;
use tessera_retrieval::{QueryQuantizer, SparseActivator};

use crate::reward::{blend, RewardTier};

pub struct ReinforcementLoop {
    store: Arc<dyn ISegmentStore>,
    values: Arc<dyn IValueStore>,
    embedder: Arc<dyn IEmbeddingProvider>,
    activator: Arc<SparseActivator>,
    quantizer: Arc<QueryQuantizer>,
    oracle: Option<Arc<dyn IScoringOracle>>,
    config: FeedbackConfig,
    learning_rate: f64,
    min_keyword_chars: usize,
}

impl ReinforcementLoop {
    pub fn new(
        store: Arc<dyn ISegmentStore>,
        values: Arc<dyn IValueStore>,
        embedder: Arc<dyn IEmbeddingProvider>,
        activator: Arc<SparseActivator>,
        quantizer: Arc<QueryQuantizer>,
        config: &TesseraConfig,
    ) -> Self {
        Self {
            store,
            values,
            embedder,
            activator,
            quantizer,
            oracle: None,
            config: config.feedback.clone(),
            learning_rate: config.selector.learning_rate,
            min_keyword_chars: config.sparse.min_keyword_chars,
        }
    }

    /// Consult `oracle` for events that carry generated text but no automatic score.
    pub fn with_oracle(mut self, oracle: Arc<dyn IScoringOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn config(&self) -> &FeedbackConfig {
        &self.config
    }

    /// Process one event. Consumes nothing but the event's data; safe to call
    /// from several threads at once.
    ///
    /// An event whose query embedding is malformed updates nothing: its
    /// cluster cannot be trusted.
    pub fn process(&self, event: &FeedbackEvent) -> FeedbackOutcome {
        let automatic = self.automatic_score(event);
        let reward = blend(automatic, event.human_signal);
        if let Err(e) = event.validate_query(self.embedder.dimensions()) {
            let fragments = event.fragment_ids.iter().collect::<HashSet<_>>().len();
            warn!(error = %e, fragments, "feedback dropped");
            return FeedbackOutcome {
                reward,
                cluster_id: DEFAULT_CLUSTER,
                updated: 0,
                update_failures: fragments,
                action: StorageAction::Skipped,
            };
        }
        let cluster = self.quantizer.assign(&event.query_embedding);

        let mut updated_values = Vec::with_capacity(event.fragment_ids.len());
        let mut update_failures = 0usize;
        let mut seen = HashSet::new();
        for id in &event.fragment_ids {
            if !seen.insert(id.as_str()) {
                continue;
            }
            match self.values.update(id, cluster, reward, self.learning_rate) {
                Ok(entry) => updated_values.push(entry.value),
                Err(e) => {
                    warn!(fragment_id = %id, cluster, error = %e, "value update failed");
                    update_failures += 1;
                }
            }
        }
        debug!(
            reward,
            cluster,
            updated = updated_values.len(),
            failures = update_failures,
            "values reinforced"
        );

        let action = self.storage_action(event, reward, cluster, &updated_values);
        info!(reward, cluster, action = ?action, "feedback processed");

        FeedbackOutcome {
            reward,
            cluster_id: cluster,
            updated: updated_values.len(),
            update_failures,
            action,
        }
    }

    /// The event's score, else the oracle's verdict on the generated text,
    /// else the neutral default.
    fn automatic_score(&self, event: &FeedbackEvent) -> f64 {
        if let Some(score) = event.automatic_score {
            return score;
        }
        let (Some(oracle), Some(text)) = (&self.oracle, &event.generated_text) else {
            return DEFAULT_AUTOMATIC_SCORE;
        };
        match oracle.score(text, &event.context) {
            Ok(score) => {
                debug!(oracle = oracle.name(), score, "automatic score from oracle");
                score
            }
            Err(e) => {
                warn!(oracle = oracle.name(), error = %e, "scoring oracle failed; using default");
                DEFAULT_AUTOMATIC_SCORE
            }
        }
    }

    fn storage_action(
        &self,
        event: &FeedbackEvent,
        reward: f64,
        cluster: ClusterId,
        updated_values: &[f64],
    ) -> StorageAction {
        let Some(text) = event.generated_text.as_deref().filter(|t| !t.trim().is_empty()) else {
            return StorageAction::Skipped;
        };
        match RewardTier::classify(reward, &self.config) {
            RewardTier::Low => StorageAction::Skipped,
            RewardTier::Medium => StorageAction::ScoredOnly,
            RewardTier::High if text.chars().count() <= self.config.min_content_chars => {
                StorageAction::ScoredOnly
            }
            RewardTier::High => {
                let seed = mean_or_default(updated_values);
                match self.reingest(event, text, reward, cluster, seed) {
                    Ok(action) => action,
                    Err(e) => {
                        warn!(error = %e, "re-ingestion failed");
                        StorageAction::Failed
                    }
                }
            }
        }
    }

    /// Store `text` as a generated fragment seeded with `seed_value` in `cluster`.
    fn reingest(
        &self,
        event: &FeedbackEvent,
        text: &str,
        reward: f64,
        cluster: ClusterId,
        seed_value: f64,
    ) -> TesseraResult<StorageAction> {
        let content_hash = Fragment::compute_content_hash(text);
        if let Some(existing) = self.store.find_by_content_hash(&content_hash)? {
            debug!(fragment_id = %existing.id, "generated text already stored");
            return Ok(StorageAction::Duplicate {
                fragment_id: existing.id,
            });
        }

        let embedding = match &event.generated_embedding {
            Some(e) if e.len() != self.embedder.dimensions() => {
                return Err(reingestion_failed(format!(
                    "generated embedding has {} dimensions, expected {}",
                    e.len(),
                    self.embedder.dimensions()
                )))
            }
            Some(e) if e.iter().any(|x| !x.is_finite()) => {
                return Err(reingestion_failed(
                    "generated embedding contains non-finite values",
                ))
            }
            Some(e) => e.clone(),
            None => self.embedder.embed(text)?,
        };

        let scope = match event.fragment_ids.first() {
            Some(first) => self.store.get(first)?.and_then(|f| f.scope),
            None => None,
        };

        let keywords = extract_keywords(text, self.min_keyword_chars);
        let provenance = Provenance::Generated {
            source_ids: event.fragment_ids.clone(),
            reward,
        };
        let mut fragment = Fragment::new(
            text,
            embedding,
            GENERATED_IMPORTANCE_WEIGHT,
            keywords,
            provenance,
        );
        fragment.scope = scope;

        self.store.create(&fragment)?;
        // Stored but unindexed would be unreachable by keyword; undo the write.
        if let Err(e) = self.activator.insert(&fragment) {
            if let Err(undo) = self.store.delete(&fragment.id) {
                warn!(
                    fragment_id = %fragment.id,
                    error = %undo,
                    "could not remove unindexed fragment"
                );
            }
            return Err(e);
        }
        // A missing seed only means the first lookup reads the default value.
        if let Err(e) = self.values.seed(&fragment.id, cluster, seed_value) {
            warn!(fragment_id = %fragment.id, cluster, error = %e, "value seed failed");
        }
        info!(
            fragment_id = %fragment.id,
            cluster,
            seed_value,
            sources = event.fragment_ids.len(),
            "generated fragment stored"
        );
        Ok(StorageAction::Stored {
            fragment_id: fragment.id,
        })
    }
}

impl IFeedbackProcessor for ReinforcementLoop {
    fn process(&self, event: &FeedbackEvent) -> FeedbackOutcome {
        ReinforcementLoop::process(self, event)
    }
}

fn mean_or_default(values: &[f64]) -> f64 {
    if values.is_empty() {
        DEFAULT_VALUE
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn reingestion_failed(reason: impl Into<String>) -> TesseraError {
    FeedbackError::ReingestionFailed {
        reason: reason.into(),
    }
    .into()
}
