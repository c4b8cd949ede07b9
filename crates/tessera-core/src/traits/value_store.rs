use std::sync::Arc;

use crate::errors::TesseraResult;
use crate::fragment::{ClusterId, ValueEntry};

/// Learned values addressed by `(fragment_id, cluster_id)`.
///
/// Implementations must apply [`update`](IValueStore::update) as one atomic
/// read-modify-write per key so concurrent feedback never drops an update.
pub trait IValueStore: Send + Sync {
    /// The stored entry, or [`ValueEntry::optimistic_default`] when absent.
    fn get_or_default(&self, fragment_id: &str, cluster: ClusterId) -> TesseraResult<ValueEntry>;

    /// Entries for several fragments under one cluster, parallel to `fragment_ids`.
    fn get_many(
        &self,
        fragment_ids: &[String],
        cluster: ClusterId,
    ) -> TesseraResult<Vec<ValueEntry>> {
        fragment_ids
            .iter()
            .map(|id| self.get_or_default(id, cluster))
            .collect()
    }

    /// Fold a reward into the entry (`v ← clamp(v + α(r − v))`, `visits += 1`)
    /// and return the new entry.
    fn update(
        &self,
        fragment_id: &str,
        cluster: ClusterId,
        reward: f64,
        learning_rate: f64,
    ) -> TesseraResult<ValueEntry>;

    /// Write an inherited starting value with zero visits.
    fn seed(&self, fragment_id: &str, cluster: ClusterId, value: f64) -> TesseraResult<()>;

    /// Drop every entry of a fragment.
    fn remove_fragment(&self, fragment_id: &str) -> TesseraResult<()>;

    /// Sum of visits over every fragment stored under `cluster`.
    fn cluster_visits(&self, cluster: ClusterId) -> TesseraResult<u64>;

    /// Number of stored (non-default) entries.
    fn entry_count(&self) -> TesseraResult<usize>;
}

impl<T: IValueStore + ?Sized> IValueStore for Arc<T> {
    fn get_or_default(&self, fragment_id: &str, cluster: ClusterId) -> TesseraResult<ValueEntry> {
        (**self).get_or_default(fragment_id, cluster)
    }

    fn get_many(
        &self,
        fragment_ids: &[String],
        cluster: ClusterId,
    ) -> TesseraResult<Vec<ValueEntry>> {
        (**self).get_many(fragment_ids, cluster)
    }

    fn update(
        &self,
        fragment_id: &str,
        cluster: ClusterId,
        reward: f64,
        learning_rate: f64,
    ) -> TesseraResult<ValueEntry> {
        (**self).update(fragment_id, cluster, reward, learning_rate)
    }

    fn seed(&self, fragment_id: &str, cluster: ClusterId, value: f64) -> TesseraResult<()> {
        (**self).seed(fragment_id, cluster, value)
    }

    fn remove_fragment(&self, fragment_id: &str) -> TesseraResult<()> {
        (**self).remove_fragment(fragment_id)
    }

    fn cluster_visits(&self, cluster: ClusterId) -> TesseraResult<u64> {
        (**self).cluster_visits(cluster)
    }

    fn entry_count(&self) -> TesseraResult<usize> {
        (**self).entry_count()
    }
}
