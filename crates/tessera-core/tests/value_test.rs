use proptest::prelude::*;
use tessera_core::constants::DEFAULT_VALUE;
use tessera_core::ValueEntry;

#[test]
fn default_is_optimistic_and_unvisited() {
    let entry = ValueEntry::default();
    assert_eq!(entry.value, DEFAULT_VALUE);
    assert_eq!(entry.visits, 0);
    assert!(entry.is_unvisited());
}

#[test]
fn update_moves_toward_reward() {
    let entry = ValueEntry::optimistic_default().updated(1.0, 0.1);
    assert!((entry.value - 0.55).abs() < 1e-12);
    assert_eq!(entry.visits, 1);
}

#[test]
fn reward_equal_to_value_is_a_fixed_point() {
    let seeded = ValueEntry::seeded(0.73);
    let after = seeded.updated(0.73, 0.1);
    assert!((after.value - 0.73).abs() < 1e-12);
    assert_eq!(after.visits, 1);
}

#[test]
fn nan_reward_does_not_poison_value() {
    let entry = ValueEntry::seeded(0.4).updated(f64::NAN, 0.1);
    assert!(entry.value.is_finite());
    assert!((0.0..=1.0).contains(&entry.value));
}

proptest! {
    #[test]
    fn updated_value_stays_in_unit_interval(
        prior in -5.0f64..5.0,
        reward in -10.0f64..10.0,
        alpha in -1.0f64..2.0,
    ) {
        let entry = ValueEntry { value: prior, visits: 3 }.updated(reward, alpha);
        prop_assert!((0.0..=1.0).contains(&entry.value));
        prop_assert_eq!(entry.visits, 4);
    }

    #[test]
    fn positive_feedback_never_decreases(
        start in 0.0f64..=1.0,
        alpha in 0.01f64..=1.0,
        rounds in 1usize..50,
    ) {
        let mut entry = ValueEntry::seeded(start);
        for _ in 0..rounds {
            let next = entry.updated(1.0, alpha);
            prop_assert!(next.value >= entry.value);
            prop_assert!(next.value <= 1.0);
            entry = next;
        }
    }
}
