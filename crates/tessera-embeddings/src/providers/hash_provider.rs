//! Deterministic hash-seeded embedding provider.
//!
//! Each token seeds a pseudo-random direction from its blake3 hash; a text
//! embeds to the L2-normalized, frequency-weighted sum of its token
//! directions. Texts sharing words land near each other. No network, no model.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tessera_core::errors::TesseraResult;
use tessera_core::text::tokenize;
use tessera_core::traits::IEmbeddingProvider;

pub struct HashEmbeddingProvider {
    dimensions: usize,
}

impl HashEmbeddingProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn token_seed(token: &str) -> u64 {
        let hash = blake3::hash(token.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }

    fn vector(&self, text: &str) -> Vec<f32> {
        let mut vec = vec![0.0f32; self.dimensions];
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return vec;
        }

        let mut tf: HashMap<&str, f32> = HashMap::new();
        for tok in &tokens {
            *tf.entry(tok.as_str()).or_default() += 1.0;
        }

        for (token, count) in tf {
            let mut rng = StdRng::seed_from_u64(Self::token_seed(token));
            // Longer tokens carry more signal than short function words.
            let weight = count * (1.0 + (token.len() as f32).ln());
            for v in vec.iter_mut() {
                *v += weight * rng.gen_range(-1.0f32..1.0);
            }
        }

        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut vec {
                *v /= norm;
            }
        }
        vec
    }
}

impl IEmbeddingProvider for HashEmbeddingProvider {
    fn embed(&self, text: &str) -> TesseraResult<Vec<f32>> {
        Ok(self.vector(text))
    }

    fn embed_batch(&self, texts: &[String]) -> TesseraResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "hash"
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn empty_text_returns_zero_vector() {
        let p = HashEmbeddingProvider::new(64);
        let v = p.embed("").unwrap();
        assert_eq!(v.len(), 64);
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn deterministic_and_normalized() {
        let p = HashEmbeddingProvider::new(128);
        let a = p.embed("the lighthouse keeper").unwrap();
        let b = p.embed("the lighthouse keeper").unwrap();
        assert_eq!(a, b);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[test]
    fn shared_words_are_closer() {
        let p = HashEmbeddingProvider::new(256);
        let a = p.embed("lighthouse keeper lamp").unwrap();
        let b = p.embed("lighthouse keeper stairs").unwrap();
        let c = p.embed("mountain caravan mules").unwrap();
        assert!(cosine(&a, &b) > cosine(&a, &c));
    }
}
