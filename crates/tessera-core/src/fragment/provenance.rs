use serde::{Deserialize, Serialize};

/// Origin of a fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Provenance {
    /// Ingested from source text.
    Authored,
    /// Produced by the feedback loop from a highly rewarded generation.
    Generated {
        /// Fragments that were selected for the generation.
        source_ids: Vec<String>,
        /// Reward that justified storing it.
        reward: f64,
    },
}

impl Provenance {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Authored => "authored",
            Self::Generated { .. } => "generated",
        }
    }
}
