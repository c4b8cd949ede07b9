use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use tessera_core::models::SelectionRequest;
use tessera_core::traits::ISegmentStore;
use tessera_core::TesseraConfig;
use tessera_retrieval::{AdaptiveSelector, QueryQuantizer, RetrievalEngine, SparseActivator};
use tessera_storage::{InMemoryValueStore, StorageEngine};
use test_fixtures::{fragment, seeded_embedding};

const WORDS: [&str; 8] = [
    "harbor", "lighthouse", "herring", "monastery", "caravan", "avalanche", "lantern", "reef",
];

fn bench_select(c: &mut Criterion) {
    let mut config = TesseraConfig::default();
    config.embedding.dimensions = 128;
    config.quantizer.clusters = 16;

    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    let fragments: Vec<_> = (0..2_000)
        .map(|i| {
            let text = format!("{} {} passage {i}", WORDS[i % 8], WORDS[(i / 8) % 8]);
            fragment(&text, seeded_embedding(128, i as u64))
        })
        .collect();
    store.create_bulk(&fragments).unwrap();

    let activator = Arc::new(SparseActivator::new(config.sparse.clone()));
    activator.build_index(store.as_ref(), None).unwrap();
    let quantizer = Arc::new(QueryQuantizer::new(config.quantizer.clone()));
    quantizer.fit_from_store(store.as_ref()).unwrap();

    let engine = RetrievalEngine::new(
        store,
        Arc::new(InMemoryValueStore::new()),
        activator,
        quantizer,
        AdaptiveSelector::seeded(config.selector.clone(), 9),
        &config,
    );
    let request = SelectionRequest::new("harbor lighthouse", seeded_embedding(128, 77), 5);

    c.bench_function("select_2k_fragments", |b| {
        b.iter(|| engine.select(&request).unwrap())
    });
}

criterion_group!(benches, bench_select);
criterion_main!(benches);
