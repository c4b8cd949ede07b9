//! Property tests: rewards stay in [0, 1], tiers are monotone in the reward,
//! and processing never panics on arbitrary events.

use std::sync::Arc;

use proptest::prelude::*;

use tessera_core::config::FeedbackConfig;
use tessera_core::models::{FeedbackEvent, HumanSignal, StorageAction};
use tessera_core::TesseraConfig;
use tessera_embeddings::HashEmbeddingProvider;
use tessera_learning::{blend, ReinforcementLoop, RewardTier};
use tessera_retrieval::{QueryQuantizer, SparseActivator};
use tessera_storage::{InMemoryValueStore, StorageEngine};

fn human() -> impl Strategy<Value = Option<HumanSignal>> {
    prop_oneof![
        Just(None),
        Just(Some(HumanSignal::Positive)),
        Just(Some(HumanSignal::Negative)),
    ]
}

fn tier_rank(t: RewardTier) -> u8 {
    match t {
        RewardTier::Low => 0,
        RewardTier::Medium => 1,
        RewardTier::High => 2,
    }
}

proptest! {
    #[test]
    fn prop_reward_is_bounded(auto in -10.0f64..10.0, signal in human()) {
        let r = blend(auto, signal);
        prop_assert!((0.0..=1.0).contains(&r));
    }

    #[test]
    fn prop_positive_signal_never_lowers_reward(auto in 0.0f64..1.0) {
        prop_assert!(blend(auto, Some(HumanSignal::Positive)) >= blend(auto, None));
        prop_assert!(blend(auto, None) >= blend(auto, Some(HumanSignal::Negative)));
    }

    #[test]
    fn prop_tier_is_monotone(a in 0.0f64..1.0, b in 0.0f64..1.0) {
        let config = FeedbackConfig::default();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(
            tier_rank(RewardTier::classify(lo, &config))
                <= tier_rank(RewardTier::classify(hi, &config))
        );
    }

    #[test]
    fn prop_process_never_panics(
        ids in prop::collection::vec("[a-z]{1,6}", 0..5),
        query in prop::collection::vec(-1.0f32..1.0, 0..6),
        auto in prop::option::of(-1.0f64..2.0),
        signal in human(),
        text in prop::option::of("[a-z ]{0,160}"),
    ) {
        let mut config = TesseraConfig::default();
        config.embedding.dimensions = 4;
        let values = Arc::new(InMemoryValueStore::new());
        let looped = ReinforcementLoop::new(
            Arc::new(StorageEngine::open_in_memory().unwrap()),
            values,
            Arc::new(HashEmbeddingProvider::new(4)),
            Arc::new(SparseActivator::new(config.sparse.clone())),
            Arc::new(QueryQuantizer::new(config.quantizer.clone())),
            &config,
        );
        let mut event = FeedbackEvent::new(ids.clone(), query);
        event.automatic_score = auto;
        event.human_signal = signal;
        event.generated_text = text;

        let outcome = looped.process(&event);
        prop_assert!((0.0..=1.0).contains(&outcome.reward));
        prop_assert_eq!(outcome.updated + outcome.update_failures, {
            let mut distinct = ids.clone();
            distinct.sort();
            distinct.dedup();
            distinct.len()
        });
        prop_assert!(outcome.action != StorageAction::Failed);
    }
}
