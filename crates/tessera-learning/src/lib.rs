//! # tessera-learning
//!
//! Feedback side of the engine: blend scores into a reward, fold it into the
//! learned values of the selected fragments, and store highly rewarded
//! generations as new fragments.
//!
//! ```text
//! submit ─► FeedbackQueue (bounded mpsc) ─► worker ─► spawn_blocking
//!                                                        │
//!                                                        ▼
//!                                              ReinforcementLoop::process
//!                                              ├── reward::blend
//!                                              ├── IValueStore::update (per fragment)
//!                                              └── re-ingestion (reward ≥ high)
//! ```

pub mod queue;
pub mod reinforcement;
pub mod reward;

pub use queue::{FeedbackQueue, QueueStats, ShutdownMode};
pub use reinforcement::ReinforcementLoop;
pub use reward::{blend, RewardTier};
