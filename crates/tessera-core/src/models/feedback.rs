use serde::{Deserialize, Serialize};

use crate::constants::NEUTRAL_HUMAN_SCORE;
use crate::errors::{TesseraError, TesseraResult};
use crate::fragment::ClusterId;

/// Thumbs-up / thumbs-down from a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HumanSignal {
    Positive,
    Negative,
}

impl HumanSignal {
    /// Score of an optional signal: positive 1.0, negative 0.0, absent 0.5.
    pub fn score(signal: Option<Self>) -> f64 {
        match signal {
            Some(Self::Positive) => 1.0,
            Some(Self::Negative) => 0.0,
            None => NEUTRAL_HUMAN_SCORE,
        }
    }
}

/// Outcome signal for a past selection. Consumed exactly once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackEvent {
    /// Fragments that were used for the generation.
    pub fragment_ids: Vec<String>,
    /// Embedding of the query that produced the selection.
    pub query_embedding: Vec<f32>,
    /// Score in [0, 1] from an automatic judge.
    #[serde(default)]
    pub automatic_score: Option<f64>,
    #[serde(default)]
    pub human_signal: Option<HumanSignal>,
    /// Generated text, candidate for re-ingestion.
    #[serde(default)]
    pub generated_text: Option<String>,
    /// Embedding of the generated text, if the caller already has one.
    #[serde(default)]
    pub generated_embedding: Option<Vec<f32>>,
    /// Context handed to the scoring oracle.
    #[serde(default)]
    pub context: Vec<String>,
}

impl FeedbackEvent {
    pub fn new(fragment_ids: Vec<String>, query_embedding: Vec<f32>) -> Self {
        Self {
            fragment_ids,
            query_embedding,
            ..Default::default()
        }
    }

    pub fn with_automatic_score(mut self, score: f64) -> Self {
        self.automatic_score = Some(score);
        self
    }

    pub fn with_human_signal(mut self, signal: HumanSignal) -> Self {
        self.human_signal = Some(signal);
        self
    }

    pub fn with_generated_text(mut self, text: impl Into<String>) -> Self {
        self.generated_text = Some(text.into());
        self
    }

    pub fn with_generated_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.generated_embedding = Some(embedding);
        self
    }

    pub fn with_context(mut self, context: Vec<String>) -> Self {
        self.context = context;
        self
    }

    /// Reject events whose query embedding could not have come from a
    /// selection, or whose generated embedding holds non-finite values.
    pub fn validate(&self, expected_dimensions: usize) -> TesseraResult<()> {
        self.validate_query(expected_dimensions)?;
        if let Some(generated) = &self.generated_embedding {
            if generated.iter().any(|x| !x.is_finite()) {
                return Err(TesseraError::invalid_input(
                    "generated embedding contains non-finite values",
                ));
            }
        }
        Ok(())
    }

    /// The query-embedding half of [`validate`](Self::validate).
    pub fn validate_query(&self, expected_dimensions: usize) -> TesseraResult<()> {
        super::check_embedding("query embedding", &self.query_embedding, expected_dimensions)
    }
}

/// Acknowledgement of a submission. Not a guarantee of processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FeedbackAck {
    Accepted,
    Rejected { reason: String },
}

impl FeedbackAck {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// What re-ingestion did with the generated text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StorageAction {
    /// A new generated fragment was stored.
    Stored { fragment_id: String },
    /// High enough to score, not high enough to store.
    ScoredOnly,
    /// Below the medium threshold, or nothing to store.
    Skipped,
    /// Identical content already exists.
    Duplicate { fragment_id: String },
    /// Storage was attempted and failed; the failure was logged.
    Failed,
}

/// Summary of processing one feedback event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackOutcome {
    pub reward: f64,
    pub cluster_id: ClusterId,
    /// Value entries successfully updated.
    pub updated: usize,
    /// Value updates that failed and were swallowed.
    pub update_failures: usize,
    pub action: StorageAction,
}
