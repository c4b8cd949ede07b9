use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_VALUE;

/// Index of a region of the query embedding space.
pub type ClusterId = u32;

/// Learned value of a fragment under one cluster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueEntry {
    /// Running reward estimate in [0, 1].
    pub value: f64,
    /// Number of rewards folded into `value`.
    pub visits: u64,
}

impl ValueEntry {
    /// Entry for a pair that has never been rewarded: `(0.5, 0)`.
    pub const fn optimistic_default() -> Self {
        Self {
            value: DEFAULT_VALUE,
            visits: 0,
        }
    }

    /// Seeded entry with zero visits, value clamped to [0, 1].
    pub fn seeded(value: f64) -> Self {
        Self {
            value: clamp_unit(value),
            visits: 0,
        }
    }

    /// Exponential moving average step: `v + α(r − v)`, clamped to [0, 1],
    /// with one more visit.
    pub fn updated(self, reward: f64, learning_rate: f64) -> Self {
        let reward = clamp_unit(reward);
        let alpha = clamp_unit(learning_rate);
        Self {
            value: clamp_unit(self.value + alpha * (reward - self.value)),
            visits: self.visits.saturating_add(1),
        }
    }

    pub fn is_unvisited(&self) -> bool {
        self.visits == 0
    }
}

impl Default for ValueEntry {
    fn default() -> Self {
        Self::optimistic_default()
    }
}

/// Clamp to [0, 1]; NaN maps to 0.
pub fn clamp_unit(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}
