//! RetrievalEngine: validate → quantize → sparse activation (or global
//! similarity fallback) → dense rerank → adaptive selection.

use std::sync::Arc;

use tracing::{debug, info};

use tessera_core::errors::{RetrievalError, TesseraError, TesseraResult};
use tessera_core::fragment::Fragment;
use tessera_core::models::{CandidatePath, SelectionRequest, SelectionResult};
use tessera_core::traits::{ISegmentStore, IValueStore};
use tessera_core::TesseraConfig;

use crate::dense::{DenseReranker, ScoredFragment};
use crate::quantizer::QueryQuantizer;
use crate::selector::AdaptiveSelector;
use crate::sparse::SparseActivator;

/// Store failures during selection surface as `Unavailable`; malformed
/// input and lock failures pass through unchanged.
fn unavailable(e: TesseraError) -> TesseraError {
    match e {
        TesseraError::StorageError(_) => RetrievalError::Unavailable {
            reason: e.to_string(),
        }
        .into(),
        other => other,
    }
}

pub struct RetrievalEngine {
    store: Arc<dyn ISegmentStore>,
    values: Arc<dyn IValueStore>,
    activator: Arc<SparseActivator>,
    quantizer: Arc<QueryQuantizer>,
    reranker: DenseReranker,
    selector: AdaptiveSelector,
    dimensions: usize,
    fallback_threshold: f64,
}

impl RetrievalEngine {
    pub fn new(
        store: Arc<dyn ISegmentStore>,
        values: Arc<dyn IValueStore>,
        activator: Arc<SparseActivator>,
        quantizer: Arc<QueryQuantizer>,
        selector: AdaptiveSelector,
        config: &TesseraConfig,
    ) -> Self {
        Self {
            store,
            values,
            activator,
            quantizer,
            reranker: DenseReranker::new(config.rerank.clone()),
            selector,
            dimensions: config.embedding.dimensions,
            fallback_threshold: config.rerank.fallback_threshold,
        }
    }

    pub fn activator(&self) -> &Arc<SparseActivator> {
        &self.activator
    }

    pub fn quantizer(&self) -> &Arc<QueryQuantizer> {
        &self.quantizer
    }

    pub fn selector(&self) -> &AdaptiveSelector {
        &self.selector
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Run the selection pipeline.
    pub fn select(&self, request: &SelectionRequest) -> TesseraResult<SelectionResult> {
        request.validate(self.dimensions)?;
        let query = &request.query_embedding;
        let cluster = self.quantizer.assign(query);

        let (path, candidates) = self.candidates(request).map_err(unavailable)?;
        if candidates.is_empty() {
            debug!(cluster, "no candidates on any path");
            return Ok(SelectionResult::empty(cluster));
        }

        let picks = self
            .selector
            .select(cluster, candidates, self.values.as_ref(), request.top_k)
            .map_err(unavailable)?;

        info!(
            cluster,
            path = ?path,
            picks = picks.len(),
            "selection complete"
        );
        Ok(SelectionResult {
            cluster_id: cluster,
            path,
            picks,
        })
    }

    /// Sparse candidates reranked, or the global similarity fallback when
    /// sparse activation yields nothing usable.
    fn candidates(
        &self,
        request: &SelectionRequest,
    ) -> TesseraResult<(CandidatePath, Vec<ScoredFragment>)> {
        let query = &request.query_embedding;

        let ids = self
            .activator
            .activate(&request.query_text, self.activator.max_candidates())?;
        if !ids.is_empty() {
            let fragments = self.store.get_bulk(&ids)?;
            let scored = self.reranker.rerank(query, fragments);
            if !scored.is_empty() {
                return Ok((CandidatePath::Sparse, scored));
            }
        }

        let hits: Vec<Fragment> = self
            .store
            .search_similar(query, self.fallback_threshold, self.reranker.top_n())?
            .into_iter()
            .map(|(f, _)| f)
            .collect();
        if hits.is_empty() {
            return Ok((CandidatePath::Empty, Vec::new()));
        }
        debug!(hits = hits.len(), "global similarity fallback");
        Ok((CandidatePath::GlobalFallback, self.reranker.rerank(query, hits)))
    }
}
