use std::sync::Arc;

use crate::errors::TesseraResult;
use crate::fragment::Fragment;

/// Durable fragment storage: CRUD, scoped listing, similarity search.
pub trait ISegmentStore: Send + Sync {
    // --- CRUD ---
    fn create(&self, fragment: &Fragment) -> TesseraResult<()>;
    fn get(&self, id: &str) -> TesseraResult<Option<Fragment>>;
    fn delete(&self, id: &str) -> TesseraResult<()>;

    // --- Bulk ---
    fn create_bulk(&self, fragments: &[Fragment]) -> TesseraResult<usize>;
    /// Fragments for the given ids, in the order requested. Missing ids are skipped.
    fn get_bulk(&self, ids: &[String]) -> TesseraResult<Vec<Fragment>>;

    // --- Query ---
    /// All fragments in insertion order, optionally restricted to one scope.
    fn list(&self, scope: Option<&str>) -> TesseraResult<Vec<Fragment>>;
    fn find_by_content_hash(&self, content_hash: &str) -> TesseraResult<Option<Fragment>>;
    fn count(&self) -> TesseraResult<usize>;
    /// Up to `limit` stored embeddings, spread across the corpus.
    fn sample_embeddings(&self, limit: usize) -> TesseraResult<Vec<Vec<f32>>>;

    // --- Search ---
    /// Fragments with cosine similarity `>= threshold`, best first, at most `limit`.
    fn search_similar(
        &self,
        embedding: &[f32],
        threshold: f64,
        limit: usize,
    ) -> TesseraResult<Vec<(Fragment, f64)>>;
}

/// Blanket impl: `Arc<T>` implements `ISegmentStore` by delegating to the inner `T`.
impl<T: ISegmentStore + ?Sized> ISegmentStore for Arc<T> {
    fn create(&self, fragment: &Fragment) -> TesseraResult<()> {
        (**self).create(fragment)
    }

    fn get(&self, id: &str) -> TesseraResult<Option<Fragment>> {
        (**self).get(id)
    }

    fn delete(&self, id: &str) -> TesseraResult<()> {
        (**self).delete(id)
    }

    fn create_bulk(&self, fragments: &[Fragment]) -> TesseraResult<usize> {
        (**self).create_bulk(fragments)
    }

    fn get_bulk(&self, ids: &[String]) -> TesseraResult<Vec<Fragment>> {
        (**self).get_bulk(ids)
    }

    fn list(&self, scope: Option<&str>) -> TesseraResult<Vec<Fragment>> {
        (**self).list(scope)
    }

    fn find_by_content_hash(&self, content_hash: &str) -> TesseraResult<Option<Fragment>> {
        (**self).find_by_content_hash(content_hash)
    }

    fn count(&self) -> TesseraResult<usize> {
        (**self).count()
    }

    fn sample_embeddings(&self, limit: usize) -> TesseraResult<Vec<Vec<f32>>> {
        (**self).sample_embeddings(limit)
    }

    fn search_similar(
        &self,
        embedding: &[f32],
        threshold: f64,
        limit: usize,
    ) -> TesseraResult<Vec<(Fragment, f64)>> {
        (**self).search_similar(embedding, threshold, limit)
    }
}
