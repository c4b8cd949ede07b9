//! End-to-end selection scenarios over the SQLite store.

use std::sync::Arc;

use tessera_core::errors::{RetrievalError, StorageError, TesseraError, TesseraResult};
use tessera_core::fragment::Fragment;
use tessera_core::models::{CandidatePath, SelectionMode, SelectionRequest};
use tessera_core::traits::{ISegmentStore, IValueStore};
use tessera_core::TesseraConfig;
use tessera_retrieval::{
    AdaptiveSelector, ClusterSpace, QueryQuantizer, RetrievalEngine, SparseActivator,
};
use tessera_storage::{InMemoryValueStore, StorageEngine};
use test_fixtures::{axis_embedding, fragment};

const DIMS: usize = 4;

fn config() -> TesseraConfig {
    let mut c = TesseraConfig::default();
    c.embedding.dimensions = DIMS;
    c.selector.exploration_rate = 0.0;
    c
}

struct Harness {
    store: Arc<StorageEngine>,
    values: Arc<InMemoryValueStore>,
    quantizer: Arc<QueryQuantizer>,
    engine: RetrievalEngine,
}

fn harness(fragments: &[Fragment]) -> Harness {
    let config = config();
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    store.create_bulk(fragments).unwrap();
    let values = Arc::new(InMemoryValueStore::new());
    let activator = Arc::new(SparseActivator::new(config.sparse.clone()));
    activator.build_index(store.as_ref(), None).unwrap();
    let quantizer = Arc::new(QueryQuantizer::new(config.quantizer.clone()));
    let engine = RetrievalEngine::new(
        store.clone(),
        values.clone(),
        activator,
        quantizer.clone(),
        AdaptiveSelector::seeded(config.selector.clone(), 1),
        &config,
    );
    Harness {
        store,
        values,
        quantizer,
        engine,
    }
}

/// Four axis-aligned centroids: a query along axis `i` lands in cluster `i`.
fn four_clusters() -> ClusterSpace {
    ClusterSpace {
        centroids: (0..4).map(|i| axis_embedding(DIMS, i)).collect(),
        dimensions: DIMS,
        seed: 0,
        fitted_at: chrono::Utc::now(),
    }
}

#[test]
fn unvisited_fragment_beats_high_value_in_cluster_three() {
    let a = fragment("the lighthouse keeper at dawn", axis_embedding(DIMS, 3));
    let b = fragment("the lighthouse beam in fog", axis_embedding(DIMS, 3));
    let h = harness(&[a.clone(), b.clone()]);
    h.quantizer.restore(four_clusters()).unwrap();

    h.values.seed(&b.id, 3, 0.9).unwrap();
    for _ in 0..10 {
        h.values.update(&b.id, 3, 0.9, 0.1).unwrap();
    }
    let b_entry = h.values.get_or_default(&b.id, 3).unwrap();
    assert_eq!(b_entry.visits, 10);
    assert!((b_entry.value - 0.9).abs() < 1e-12);

    let req = SelectionRequest::new("lighthouse", axis_embedding(DIMS, 3), 2);
    let result = h.engine.select(&req).unwrap();
    assert_eq!(result.cluster_id, 3);
    assert_eq!(result.path, CandidatePath::Sparse);
    assert_eq!(result.picks[0].fragment.id, a.id);
    assert_eq!(result.picks[0].visits, 0);
    assert_eq!(result.picks[0].mode, SelectionMode::Exploit);
    assert_eq!(result.picks[1].fragment.id, b.id);
}

#[test]
fn zero_visit_fragments_precede_visited_ones() {
    let fragments: Vec<Fragment> = (0..6)
        .map(|i| fragment(&format!("harbor passage {i}"), axis_embedding(DIMS, i)))
        .collect();
    let h = harness(&fragments);
    for f in &fragments[..3] {
        h.values.update(&f.id, 0, 1.0, 0.5).unwrap();
    }

    let req = SelectionRequest::new("harbor", axis_embedding(DIMS, 0), 6);
    let result = h.engine.select(&req).unwrap();
    let first_visited = result.picks.iter().position(|p| p.visits > 0).unwrap();
    assert_eq!(first_visited, 3);
    assert!(result.picks[..3].iter().all(|p| p.visits == 0));
}

#[test]
fn empty_store_returns_empty_result() {
    let h = harness(&[]);
    let req = SelectionRequest::new("anything at all", axis_embedding(DIMS, 0), 5);
    let result = h.engine.select(&req).unwrap();
    assert!(result.is_empty());
    assert_eq!(result.path, CandidatePath::Empty);
    assert_eq!(result.cluster_id, 0);
}

#[test]
fn blank_query_text_uses_global_fallback() {
    let near = fragment("quiet monastery bell", vec![1.0, 0.1, 0.0, 0.0]);
    let far = fragment("caravan mules", vec![0.0, 0.0, 0.0, 1.0]);
    let h = harness(&[near.clone(), far]);

    let req = SelectionRequest::new("", vec![1.0, 0.0, 0.0, 0.0], 3);
    let result = h.engine.select(&req).unwrap();
    assert_eq!(result.path, CandidatePath::GlobalFallback);
    assert_eq!(result.fragment_ids(), vec![near.id]);
}

#[test]
fn malformed_requests_are_rejected() {
    let h = harness(&[]);
    for req in [
        SelectionRequest::new("q", vec![], 3),
        SelectionRequest::new("q", vec![1.0, 0.0], 3),
        SelectionRequest::new("q", axis_embedding(DIMS, 0), 0),
        SelectionRequest::new("q", vec![f32::NAN, 0.0, 0.0, 0.0], 1),
    ] {
        let err = h.engine.select(&req).unwrap_err();
        assert!(matches!(err, TesseraError::InvalidInput { .. }), "{err:?}");
    }
}

#[test]
fn top_k_limits_picks() {
    let fragments: Vec<Fragment> = (0..5)
        .map(|i| fragment(&format!("snow on the pass {i}"), axis_embedding(DIMS, 0)))
        .collect();
    let h = harness(&fragments);
    let req = SelectionRequest::new("snow pass", axis_embedding(DIMS, 0), 2);
    assert_eq!(h.engine.select(&req).unwrap().len(), 2);
    assert_eq!(h.store.count().unwrap(), 5);
}

struct BrokenStore;

impl ISegmentStore for BrokenStore {
    fn create(&self, _: &Fragment) -> TesseraResult<()> {
        Err(down())
    }
    fn get(&self, _: &str) -> TesseraResult<Option<Fragment>> {
        Err(down())
    }
    fn delete(&self, _: &str) -> TesseraResult<()> {
        Err(down())
    }
    fn create_bulk(&self, _: &[Fragment]) -> TesseraResult<usize> {
        Err(down())
    }
    fn get_bulk(&self, _: &[String]) -> TesseraResult<Vec<Fragment>> {
        Err(down())
    }
    fn list(&self, _: Option<&str>) -> TesseraResult<Vec<Fragment>> {
        Err(down())
    }
    fn find_by_content_hash(&self, _: &str) -> TesseraResult<Option<Fragment>> {
        Err(down())
    }
    fn count(&self) -> TesseraResult<usize> {
        Err(down())
    }
    fn sample_embeddings(&self, _: usize) -> TesseraResult<Vec<Vec<f32>>> {
        Err(down())
    }
    fn search_similar(&self, _: &[f32], _: f64, _: usize) -> TesseraResult<Vec<(Fragment, f64)>> {
        Err(down())
    }
}

fn down() -> TesseraError {
    StorageError::SqliteError {
        message: "disk unplugged".into(),
    }
    .into()
}

#[test]
fn store_failure_surfaces_unavailable() {
    let config = config();
    let engine = RetrievalEngine::new(
        Arc::new(BrokenStore),
        Arc::new(InMemoryValueStore::new()),
        Arc::new(SparseActivator::default()),
        Arc::new(QueryQuantizer::default()),
        AdaptiveSelector::seeded(config.selector.clone(), 1),
        &config,
    );
    let err = engine
        .select(&SelectionRequest::new("q", axis_embedding(DIMS, 0), 1))
        .unwrap_err();
    assert!(matches!(
        err,
        TesseraError::RetrievalError(RetrievalError::Unavailable { .. })
    ));
    assert!(err.is_unavailable());
}

#[test]
fn fitted_quantizer_routes_queries() {
    let fragments: Vec<Fragment> = (0..8)
        .map(|i| fragment(&format!("bell {i}"), axis_embedding(DIMS, i % 2)))
        .collect();
    let h = harness(&fragments);
    let k = h.quantizer.fit_from_store(h.store.as_ref()).unwrap();
    assert_eq!(k, 2);
    let a = h.quantizer.assign(&axis_embedding(DIMS, 0));
    let b = h.quantizer.assign(&axis_embedding(DIMS, 1));
    assert_ne!(a, b);
}
