mod provenance;
mod value;

pub use provenance::Provenance;
pub use value::{clamp_unit, ClusterId, ValueEntry};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An immutable unit of text with its dense representation.
///
/// Learned selection values are not stored here: they live in an
/// [`IValueStore`](crate::traits::IValueStore) keyed by `(id, cluster)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fragment {
    /// UUID v4 identifier.
    pub id: String,
    /// Fragment text. Edits create a new fragment.
    pub content: String,
    /// Dense vector of the configured dimensionality.
    pub embedding: Vec<f32>,
    /// Structural significance, `>= 0`.
    pub importance_weight: f64,
    /// Sorted, deduplicated keywords for sparse activation.
    pub keywords: Vec<String>,
    /// Where the text came from.
    pub provenance: Provenance,
    /// Optional grouping such as a book id.
    #[serde(default)]
    pub scope: Option<String>,
    /// blake3 hash of `content`.
    pub content_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Fragment {
    /// Build a fragment with a fresh id. Keywords are sorted and deduplicated,
    /// negative importance is clamped to zero.
    pub fn new(
        content: impl Into<String>,
        embedding: Vec<f32>,
        importance_weight: f64,
        keywords: Vec<String>,
        provenance: Provenance,
    ) -> Self {
        let content = content.into();
        let mut keywords = keywords;
        keywords.sort();
        keywords.dedup();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content_hash: Self::compute_content_hash(&content),
            content,
            embedding,
            importance_weight: importance_weight.max(0.0),
            keywords,
            provenance,
            scope: None,
            created_at: Utc::now(),
        }
    }

    /// Attach a scope.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// blake3 hash of the text, hex encoded.
    pub fn compute_content_hash(content: &str) -> String {
        blake3::hash(content.as_bytes()).to_hex().to_string()
    }

    /// Embedding dimensionality.
    pub fn dimensions(&self) -> usize {
        self.embedding.len()
    }

    pub fn is_generated(&self) -> bool {
        matches!(self.provenance, Provenance::Generated { .. })
    }
}

/// Identity equality: two fragments are equal if they have the same id.
impl PartialEq for Fragment {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
