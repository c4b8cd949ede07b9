//! Property tests: insert→get roundtrip, value updates stay in [0, 1].

use proptest::prelude::*;

use tessera_core::traits::{ISegmentStore, IValueStore};
use tessera_storage::StorageEngine;
use test_fixtures::fragment;

proptest! {
    #[test]
    fn prop_insert_get_roundtrip(
        content in "[a-zA-Z0-9 ]{1,100}",
        embedding in prop::collection::vec(-1.0f32..1.0, 1..32),
    ) {
        let engine = StorageEngine::open_in_memory().unwrap();
        let f = fragment(&content, embedding.clone());
        engine.create(&f).unwrap();
        let got = engine.get(&f.id).unwrap().unwrap();

        prop_assert_eq!(&got.content, &content);
        prop_assert_eq!(&got.embedding, &embedding);
        prop_assert_eq!(&got.keywords, &f.keywords);
    }

    #[test]
    fn prop_updates_stay_bounded(
        rewards in prop::collection::vec(-2.0f64..3.0, 1..40),
        lr in 0.0f64..1.0,
    ) {
        let engine = StorageEngine::open_in_memory().unwrap();
        let f = fragment("bounded", vec![1.0, 0.0]);
        engine.create(&f).unwrap();
        for r in &rewards {
            let e = engine.update(&f.id, 0, *r, lr).unwrap();
            prop_assert!((0.0..=1.0).contains(&e.value));
        }
        prop_assert_eq!(engine.get_or_default(&f.id, 0).unwrap().visits, rewards.len() as u64);
    }
}
