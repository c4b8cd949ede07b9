use serde::{Deserialize, Serialize};

use crate::errors::{TesseraError, TesseraResult};
use crate::fragment::{ClusterId, Fragment};

/// A request to pick the fragments that best serve a generation query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionRequest {
    pub query_text: String,
    pub query_embedding: Vec<f32>,
    pub top_k: usize,
}

impl SelectionRequest {
    pub fn new(query_text: impl Into<String>, query_embedding: Vec<f32>, top_k: usize) -> Self {
        Self {
            query_text: query_text.into(),
            query_embedding,
            top_k,
        }
    }

    /// Reject malformed requests before any index access.
    pub fn validate(&self, expected_dimensions: usize) -> TesseraResult<()> {
        if self.top_k == 0 {
            return Err(TesseraError::invalid_input("top_k must be at least 1"));
        }
        super::check_embedding("query embedding", &self.query_embedding, expected_dimensions)
    }
}

/// Whether a pick came from the random permutation or the UCB ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    Explore,
    Exploit,
}

/// Which candidate source fed the selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidatePath {
    /// Keyword activation produced candidates.
    Sparse,
    /// No keyword matched; candidates came from a store-wide similarity search.
    GlobalFallback,
    /// Neither path produced anything.
    Empty,
}

/// One selected fragment with the learned state that justified it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedFragment {
    pub fragment: Fragment,
    pub cluster_id: ClusterId,
    /// Value read at selection time.
    pub value: f64,
    /// Visits read at selection time.
    pub visits: u64,
    pub mode: SelectionMode,
    /// Combined dense score from the reranker.
    pub rerank_score: f64,
}

/// Ordered picks for a selection request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionResult {
    pub cluster_id: ClusterId,
    pub path: CandidatePath,
    pub picks: Vec<SelectedFragment>,
}

impl SelectionResult {
    pub fn empty(cluster_id: ClusterId) -> Self {
        Self {
            cluster_id,
            path: CandidatePath::Empty,
            picks: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.picks.len()
    }

    /// Ids of the picks, in order.
    pub fn fragment_ids(&self) -> Vec<String> {
        self.picks.iter().map(|p| p.fragment.id.clone()).collect()
    }
}
