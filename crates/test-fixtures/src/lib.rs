//! Test fixtures for Tessera: a small labelled corpus, a sample chapter for
//! ingestion, and deterministic embedding/fragment builders.

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use tessera_core::fragment::{Fragment, Provenance};
use tessera_core::text::extract_keywords;

/// Root directory of the bundled fixture data.
fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// Load a text fixture verbatim.
pub fn load_text(relative_path: &str) -> String {
    let path = fixtures_root().join(relative_path);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e))
}

/// Get the absolute path to a fixture file.
pub fn fixture_path(relative_path: &str) -> PathBuf {
    fixtures_root().join(relative_path)
}

/// One labelled passage of the small corpus. `topic` picks the embedding axis.
#[derive(Debug, Clone, Deserialize)]
pub struct CorpusEntry {
    pub content: String,
    pub topic: usize,
    #[serde(default)]
    pub importance: Option<f64>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// The labelled corpus under `corpus/small_library.json`.
pub fn small_library() -> Vec<CorpusEntry> {
    load_fixture("corpus/small_library.json")
}

/// Build fragments from the small corpus with topic-axis embeddings.
pub fn small_library_fragments(dims: usize) -> Vec<Fragment> {
    small_library()
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            let embedding = topic_embedding(dims, entry.topic, i as u64);
            let mut f = fragment_with(&entry.content, embedding, entry.importance.unwrap_or(1.0));
            f.scope = entry.scope;
            f
        })
        .collect()
}

/// Unit vector along `axis`.
pub fn axis_embedding(dims: usize, axis: usize) -> Vec<f32> {
    let mut v = vec![0.0; dims];
    v[axis % dims] = 1.0;
    v
}

/// Deterministic pseudo-random unit vector.
pub fn seeded_embedding(dims: usize, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let v: Vec<f32> = (0..dims).map(|_| rng.gen_range(-1.0f32..1.0)).collect();
    normalize(v)
}

/// Mostly `axis`, with a small seeded perturbation so vectors on one topic
/// are close but not identical.
pub fn topic_embedding(dims: usize, axis: usize, seed: u64) -> Vec<f32> {
    let noise = seeded_embedding(dims, seed);
    let base = axis_embedding(dims, axis);
    normalize(
        base.iter()
            .zip(noise.iter())
            .map(|(b, n)| b + 0.1 * n)
            .collect(),
    )
}

fn normalize(v: Vec<f32>) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 {
        return v;
    }
    v.into_iter().map(|x| x / norm).collect()
}

/// An authored fragment with keywords extracted from its content.
pub fn fragment_with(content: &str, embedding: Vec<f32>, importance: f64) -> Fragment {
    Fragment::new(
        content,
        embedding,
        importance,
        extract_keywords(content, 3),
        Provenance::Authored,
    )
}

/// An authored fragment with importance 1.0.
pub fn fragment(content: &str, embedding: Vec<f32>) -> Fragment {
    fragment_with(content, embedding, 1.0)
}

/// `n` authored fragments sharing `keyword`, each on its own embedding axis.
pub fn keyword_fragments(n: usize, keyword: &str, dims: usize) -> Vec<Fragment> {
    (0..n)
        .map(|i| {
            fragment(
                &format!("passage {i} about the {keyword}"),
                axis_embedding(dims, i),
            )
        })
        .collect()
}
