//! In-memory embedding cache using moka (TinyLFU admission, idle TTL).

use std::time::Duration;

use moka::sync::Cache;

/// Keys are blake3 text hashes. Values are embedding vectors.
pub struct L1MemoryCache {
    cache: Cache<String, Vec<f32>>,
}

impl L1MemoryCache {
    pub fn new(max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_idle(Duration::from_secs(3600))
            .build();
        Self { cache }
    }

    pub fn get(&self, key: &str) -> Option<Vec<f32>> {
        self.cache.get(key)
    }

    pub fn insert(&self, key: String, embedding: Vec<f32>) {
        self.cache.insert(key, embedding);
    }

    /// Approximate entry count (moka applies writes lazily).
    pub fn len(&self) -> u64 {
        self.cache.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}
