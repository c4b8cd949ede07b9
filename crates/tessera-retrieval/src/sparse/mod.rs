//! Sparse Activator: keyword narrowing ahead of dense scoring.

mod inverted_index;

pub use inverted_index::InvertedIndex;

use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use tessera_core::config::SparseConfig;
use tessera_core::errors::{RetrievalError, TesseraResult};
use tessera_core::fragment::Fragment;
use tessera_core::text::extract_keywords;
use tessera_core::traits::ISegmentStore;

/// Live inverted index behind a copy-and-swap lock. Readers clone the `Arc`
/// and never block a rebuild.
pub struct SparseActivator {
    index: RwLock<Arc<InvertedIndex>>,
    config: SparseConfig,
}

impl SparseActivator {
    pub fn new(config: SparseConfig) -> Self {
        Self {
            index: RwLock::new(Arc::new(InvertedIndex::new())),
            config,
        }
    }

    fn poisoned() -> RetrievalError {
        RetrievalError::LockPoisoned {
            component: "sparse index".to_string(),
        }
    }

    /// Current index snapshot.
    pub fn snapshot(&self) -> TesseraResult<Arc<InvertedIndex>> {
        Ok(Arc::clone(&*self.index.read().map_err(|_| Self::poisoned())?))
    }

    /// Rebuild from the store (optionally one scope) and swap it in.
    /// Returns the number of indexed fragments.
    pub fn build_index(
        &self,
        store: &dyn ISegmentStore,
        scope: Option<&str>,
    ) -> TesseraResult<usize> {
        let fragments = store.list(scope)?;
        let built = InvertedIndex::from_fragments(&fragments);
        let count = built.len();
        info!(
            fragments = count,
            vocabulary = built.vocabulary_size(),
            scope = scope.unwrap_or("*"),
            "sparse index built"
        );
        *self.index.write().map_err(|_| Self::poisoned())? = Arc::new(built);
        Ok(count)
    }

    /// Candidate ids for `query_text`, best first. Empty when nothing matches.
    pub fn activate(&self, query_text: &str, top_k: usize) -> TesseraResult<Vec<String>> {
        let keywords = extract_keywords(query_text, self.config.min_keyword_chars);
        if keywords.is_empty() {
            return Ok(Vec::new());
        }
        let index = self.snapshot()?;
        let hits = index.lookup(&keywords, top_k);
        debug!(keywords = keywords.len(), hits = hits.len(), "sparse activation");
        Ok(hits)
    }

    /// Append one fragment to the live index.
    pub fn insert(&self, fragment: &Fragment) -> TesseraResult<()> {
        let mut guard = self.index.write().map_err(|_| Self::poisoned())?;
        Arc::make_mut(&mut *guard).insert(&fragment.id, &fragment.keywords);
        Ok(())
    }

    pub fn remove(&self, id: &str) -> TesseraResult<bool> {
        let mut guard = self.index.write().map_err(|_| Self::poisoned())?;
        Ok(Arc::make_mut(&mut *guard).remove(id))
    }

    pub fn len(&self) -> usize {
        self.snapshot().map(|i| i.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn vocabulary_size(&self) -> usize {
        self.snapshot().map(|i| i.vocabulary_size()).unwrap_or(0)
    }

    /// Cap on candidates handed to the reranker.
    pub fn max_candidates(&self) -> usize {
        self.config.max_candidates
    }
}

impl Default for SparseActivator {
    fn default() -> Self {
        Self::new(SparseConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::fragment::Provenance;

    fn frag(content: &str) -> Fragment {
        Fragment::new(
            content,
            vec![1.0],
            1.0,
            extract_keywords(content, 3),
            Provenance::Authored,
        )
    }

    #[test]
    fn empty_query_activates_nothing() {
        let activator = SparseActivator::default();
        activator.insert(&frag("lighthouse keeper")).unwrap();
        assert!(activator.activate("", 10).unwrap().is_empty());
        assert!(activator.activate("   the of ", 10).unwrap().is_empty());
    }

    #[test]
    fn old_snapshot_survives_insert() {
        let activator = SparseActivator::default();
        let before = activator.snapshot().unwrap();
        activator.insert(&frag("harbor fog")).unwrap();
        assert_eq!(before.len(), 0);
        assert_eq!(activator.len(), 1);
    }
}
