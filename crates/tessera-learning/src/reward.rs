//! Reward blending and quality tiers.

use serde::{Deserialize, Serialize};

use tessera_core::config::FeedbackConfig;
use tessera_core::constants::{AUTOMATIC_REWARD_WEIGHT, HUMAN_REWARD_WEIGHT};
use tessera_core::fragment::clamp_unit;
use tessera_core::models::HumanSignal;

/// `clamp(0.7 × automatic + 0.3 × human)`. The automatic score is clamped
/// before blending so an out-of-range judge cannot dominate.
pub fn blend(automatic: f64, human: Option<HumanSignal>) -> f64 {
    clamp_unit(
        AUTOMATIC_REWARD_WEIGHT * clamp_unit(automatic)
            + HUMAN_REWARD_WEIGHT * HumanSignal::score(human),
    )
}

/// Where a reward falls relative to the quality thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardTier {
    /// `reward ≥ high`: eligible for re-ingestion.
    High,
    /// `medium ≤ reward < high`: scored only.
    Medium,
    Low,
}

impl RewardTier {
    pub fn classify(reward: f64, config: &FeedbackConfig) -> Self {
        if reward >= config.high_quality_threshold {
            Self::High
        } else if reward >= config.medium_quality_threshold {
            Self::Medium
        } else {
            Self::Low
        }
    }
}
