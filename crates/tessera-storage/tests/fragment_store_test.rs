//! Segment store behaviour on the in-memory engine: CRUD, ordering, scopes,
//! content-hash lookup, similarity search, sampling.

use tessera_core::fragment::{Fragment, Provenance};
use tessera_core::traits::{ISegmentStore, IValueStore};
use tessera_storage::StorageEngine;
use test_fixtures::{axis_embedding, fragment, keyword_fragments, small_library_fragments};

#[test]
fn create_then_get_preserves_fields() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let f = Fragment::new(
        "The keeper lit the lamp.",
        vec![0.5, -0.25, 1.0],
        1.5,
        vec!["lamp".into(), "keeper".into(), "lamp".into()],
        Provenance::Generated {
            source_ids: vec!["a".into(), "b".into()],
            reward: 0.9,
        },
    )
    .with_scope("book-1");
    engine.create(&f).unwrap();

    let got = engine.get(&f.id).unwrap().unwrap();
    assert_eq!(got.content, f.content);
    assert_eq!(got.embedding, f.embedding);
    assert_eq!(got.importance_weight, 1.5);
    assert_eq!(got.keywords, vec!["keeper".to_string(), "lamp".to_string()]);
    assert_eq!(got.provenance, f.provenance);
    assert_eq!(got.scope.as_deref(), Some("book-1"));
    assert_eq!(got.content_hash, f.content_hash);
}

#[test]
fn get_missing_returns_none() {
    let engine = StorageEngine::open_in_memory().unwrap();
    assert!(engine.get("nope").unwrap().is_none());
}

#[test]
fn duplicate_id_is_rejected() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let f = fragment("same", axis_embedding(4, 0));
    engine.create(&f).unwrap();
    assert!(engine.create(&f).is_err());
}

#[test]
fn list_keeps_insertion_order_and_filters_scope() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let fragments = small_library_fragments(8);
    engine.create_bulk(&fragments).unwrap();

    let all = engine.list(None).unwrap();
    let ids: Vec<_> = all.iter().map(|f| f.id.clone()).collect();
    let expected: Vec<_> = fragments.iter().map(|f| f.id.clone()).collect();
    assert_eq!(ids, expected);

    let harbor = engine.list(Some("harbor")).unwrap();
    assert_eq!(harbor.len(), 4);
    assert!(harbor.iter().all(|f| f.scope.as_deref() == Some("harbor")));
    assert!(engine.list(Some("desert")).unwrap().is_empty());
}

#[test]
fn get_bulk_follows_request_order_and_skips_missing() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let fragments = keyword_fragments(3, "lighthouse", 4);
    engine.create_bulk(&fragments).unwrap();

    let ids = vec![
        fragments[2].id.clone(),
        "missing".to_string(),
        fragments[0].id.clone(),
    ];
    let got = engine.get_bulk(&ids).unwrap();
    assert_eq!(got.len(), 2);
    assert_eq!(got[0].id, fragments[2].id);
    assert_eq!(got[1].id, fragments[0].id);
}

#[test]
fn find_by_content_hash() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let f = fragment("unique passage", axis_embedding(4, 1));
    engine.create(&f).unwrap();
    let hash = Fragment::compute_content_hash("unique passage");
    assert_eq!(engine.find_by_content_hash(&hash).unwrap().unwrap().id, f.id);
    let other = Fragment::compute_content_hash("other");
    assert!(engine.find_by_content_hash(&other).unwrap().is_none());
}

#[test]
fn delete_removes_fragment_and_values() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let f = fragment("short lived", axis_embedding(4, 0));
    engine.create(&f).unwrap();
    engine.update(&f.id, 2, 1.0, 0.1).unwrap();
    assert_eq!(engine.entry_count().unwrap(), 1);

    engine.delete(&f.id).unwrap();
    assert!(engine.get(&f.id).unwrap().is_none());
    assert_eq!(engine.entry_count().unwrap(), 0);
    assert_eq!(engine.count().unwrap(), 0);
}

#[test]
fn search_similar_ranks_and_thresholds() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let a = fragment("east", vec![1.0, 0.0, 0.0]);
    let b = fragment("north east", vec![0.7, 0.7, 0.0]);
    let c = fragment("up", vec![0.0, 0.0, 1.0]);
    let wrong_dims = fragment("flat", vec![1.0, 0.0]);
    engine.create_bulk(&[a.clone(), b.clone(), c, wrong_dims]).unwrap();

    let hits = engine.search_similar(&[1.0, 0.0, 0.0], 0.2, 10).unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].0.id, a.id);
    assert_eq!(hits[1].0.id, b.id);
    assert!(hits[0].1 > hits[1].1);

    let limited = engine.search_similar(&[1.0, 0.0, 0.0], 0.2, 1).unwrap();
    assert_eq!(limited.len(), 1);
}

#[test]
fn search_with_zero_query_is_empty() {
    let engine = StorageEngine::open_in_memory().unwrap();
    engine.create(&fragment("x", vec![1.0, 0.0])).unwrap();
    assert!(engine.search_similar(&[0.0, 0.0], 0.0, 5).unwrap().is_empty());
}

#[test]
fn sample_embeddings_respects_limit() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let fragments = keyword_fragments(10, "bell", 16);
    engine.create_bulk(&fragments).unwrap();

    assert_eq!(engine.sample_embeddings(4).unwrap().len(), 4);
    assert_eq!(engine.sample_embeddings(100).unwrap().len(), 10);
    assert!(engine.sample_embeddings(0).unwrap().is_empty());
}

#[test]
fn bulk_insert_is_all_or_nothing() {
    let engine = StorageEngine::open_in_memory().unwrap();
    let first = fragment("first", axis_embedding(4, 0));
    engine.create(&first).unwrap();

    let fresh = fragment("fresh", axis_embedding(4, 1));
    let result = engine.create_bulk(&[fresh.clone(), first.clone()]);
    assert!(result.is_err());
    assert!(engine.get(&fresh.id).unwrap().is_none());
    assert_eq!(engine.count().unwrap(), 1);
}
