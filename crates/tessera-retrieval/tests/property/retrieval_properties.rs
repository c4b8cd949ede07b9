//! Property tests: zero-visit precedence, bounded values, monotone
//! convergence, sparse activation never errors.

use proptest::prelude::*;

use tessera_core::config::SelectorConfig;
use tessera_core::models::SelectionMode;
use tessera_core::traits::IValueStore;
use tessera_retrieval::{AdaptiveSelector, ScoredFragment, SparseActivator};
use tessera_storage::InMemoryValueStore;
use test_fixtures::{axis_embedding, fragment};

proptest! {
    #[test]
    fn prop_unvisited_always_first_under_exploit(
        visits in prop::collection::vec(0u32..5, 1..20),
        rewards in prop::collection::vec(0.0f64..1.0, 20),
    ) {
        let values = InMemoryValueStore::new();
        let candidates: Vec<ScoredFragment> = visits
            .iter()
            .enumerate()
            .map(|(i, _)| ScoredFragment {
                fragment: fragment(&format!("f{i}"), axis_embedding(4, i)),
                score: 1.0 - i as f64 * 0.01,
            })
            .collect();
        for (i, n) in visits.iter().enumerate() {
            for _ in 0..*n {
                values.update(&candidates[i].fragment.id, 0, rewards[i], 0.1).unwrap();
            }
        }

        let selector = AdaptiveSelector::seeded(SelectorConfig::default(), 3);
        let picks = selector
            .select_with_mode(SelectionMode::Exploit, 0, candidates, &values, visits.len())
            .unwrap();
        let first_visited = picks.iter().position(|p| p.visits > 0).unwrap_or(picks.len());
        prop_assert!(picks[first_visited..].iter().all(|p| p.visits > 0));
        prop_assert_eq!(picks.len(), visits.len());
    }

    #[test]
    fn prop_positive_feedback_is_monotone(
        prior in 0.0f64..1.0,
        steps in 1usize..50,
        alpha in 0.01f64..1.0,
    ) {
        let values = InMemoryValueStore::new();
        values.seed("f", 0, prior).unwrap();
        let mut last = prior;
        for _ in 0..steps {
            let e = values.update("f", 0, 1.0, alpha).unwrap();
            prop_assert!(e.value >= last);
            prop_assert!(e.value <= 1.0);
            last = e.value;
        }
    }

    #[test]
    fn prop_activate_never_errors(query in ".{0,64}") {
        let activator = SparseActivator::default();
        activator.insert(&fragment("harbor fog lighthouse", axis_embedding(4, 0))).unwrap();
        let hits = activator.activate(&query, 10).unwrap();
        prop_assert!(hits.len() <= 1);
    }
}
