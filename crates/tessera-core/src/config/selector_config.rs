use serde::{Deserialize, Serialize};

use super::defaults;

/// Adaptive selector configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Probability ε of returning a random permutation instead of the UCB order.
    pub exploration_rate: f64,
    /// α in `v ← v + α(r − v)`.
    pub learning_rate: f64,
    /// c in the UCB bonus.
    pub ucb_constant: f64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            exploration_rate: defaults::DEFAULT_EXPLORATION_RATE,
            learning_rate: defaults::DEFAULT_LEARNING_RATE,
            ucb_constant: defaults::DEFAULT_UCB_CONSTANT,
        }
    }
}
