/// Tessera system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Optimistic value assumed for a (fragment, cluster) pair that has never been rewarded.
pub const DEFAULT_VALUE: f64 = 0.5;

/// Cluster used for every query while no partition has been fitted.
pub const DEFAULT_CLUSTER: u32 = 0;

/// Importance weight given to fragments produced by re-ingestion.
pub const GENERATED_IMPORTANCE_WEIGHT: f64 = 1.0;

/// Share of the automatic score in the blended reward.
pub const AUTOMATIC_REWARD_WEIGHT: f64 = 0.7;

/// Share of the human signal in the blended reward.
pub const HUMAN_REWARD_WEIGHT: f64 = 0.3;

/// Automatic score assumed when neither the event nor an oracle provides one.
pub const DEFAULT_AUTOMATIC_SCORE: f64 = 0.5;

/// Human score assumed when no human signal was given.
pub const NEUTRAL_HUMAN_SCORE: f64 = 0.5;

/// Maximum batch size for bulk store operations.
pub const MAX_BULK_BATCH_SIZE: usize = 1000;

/// Importance weight of an ordinary ingested paragraph before boosts.
pub const BASE_IMPORTANCE_WEIGHT: f64 = 1.0;
