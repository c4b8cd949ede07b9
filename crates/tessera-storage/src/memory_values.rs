//! In-process value store.

use dashmap::DashMap;

use tessera_core::errors::TesseraResult;
use tessera_core::fragment::{ClusterId, ValueEntry};
use tessera_core::traits::IValueStore;

/// Value table held in a sharded concurrent map. Updates go through the
/// entry API, which holds the shard lock for the whole read-modify-write.
#[derive(Debug, Default)]
pub struct InMemoryValueStore {
    entries: DashMap<(String, ClusterId), ValueEntry>,
}

impl InMemoryValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IValueStore for InMemoryValueStore {
    fn get_or_default(&self, fragment_id: &str, cluster: ClusterId) -> TesseraResult<ValueEntry> {
        Ok(self
            .entries
            .get(&(fragment_id.to_string(), cluster))
            .map(|e| *e)
            .unwrap_or_else(ValueEntry::optimistic_default))
    }

    fn update(
        &self,
        fragment_id: &str,
        cluster: ClusterId,
        reward: f64,
        learning_rate: f64,
    ) -> TesseraResult<ValueEntry> {
        let mut entry = self
            .entries
            .entry((fragment_id.to_string(), cluster))
            .or_insert_with(ValueEntry::optimistic_default);
        *entry = entry.updated(reward, learning_rate);
        Ok(*entry)
    }

    fn seed(&self, fragment_id: &str, cluster: ClusterId, value: f64) -> TesseraResult<()> {
        self.entries
            .insert((fragment_id.to_string(), cluster), ValueEntry::seeded(value));
        Ok(())
    }

    fn remove_fragment(&self, fragment_id: &str) -> TesseraResult<()> {
        self.entries.retain(|(id, _), _| id != fragment_id);
        Ok(())
    }

    fn cluster_visits(&self, cluster: ClusterId) -> TesseraResult<u64> {
        Ok(self
            .entries
            .iter()
            .filter(|e| e.key().1 == cluster)
            .map(|e| e.value().visits)
            .sum())
    }

    fn entry_count(&self) -> TesseraResult<usize> {
        Ok(self.entries.len())
    }
}
