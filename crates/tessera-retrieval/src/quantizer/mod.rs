//! Query Space Quantizer: maps query embeddings to a fixed set of clusters so
//! learned values generalize across similar queries.

pub mod kmeans;

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use tessera_core::config::QuantizerConfig;
use tessera_core::constants::DEFAULT_CLUSTER;
use tessera_core::errors::{RetrievalError, TesseraResult};
use tessera_core::fragment::ClusterId;
use tessera_core::traits::ISegmentStore;

use kmeans::{distinct_points, nearest, KMeansParams};

/// A fitted partition. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSpace {
    pub centroids: Vec<Vec<f32>>,
    pub dimensions: usize,
    pub seed: u64,
    pub fitted_at: DateTime<Utc>,
}

impl ClusterSpace {
    /// Nearest centroid by squared Euclidean distance.
    pub fn assign(&self, embedding: &[f32]) -> ClusterId {
        nearest(&self.centroids, embedding) as ClusterId
    }

    pub fn len(&self) -> usize {
        self.centroids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centroids.is_empty()
    }
}

/// Holds the current partition behind a copy-and-swap lock.
pub struct QueryQuantizer {
    space: RwLock<Option<Arc<ClusterSpace>>>,
    config: QuantizerConfig,
}

impl QueryQuantizer {
    pub fn new(config: QuantizerConfig) -> Self {
        Self {
            space: RwLock::new(None),
            config,
        }
    }

    fn fit_failed(reason: impl Into<String>) -> RetrievalError {
        RetrievalError::FitFailed {
            reason: reason.into(),
        }
    }

    /// Fit K centroids to `samples` and swap them in. Returns the cluster count.
    pub fn fit(&self, samples: &[Vec<f32>]) -> TesseraResult<usize> {
        let points = distinct_points(samples);
        let Some(first) = points.first() else {
            return Err(Self::fit_failed("no samples").into());
        };
        let dimensions = first.len();
        if dimensions == 0 || points.iter().any(|p| p.len() != dimensions) {
            return Err(Self::fit_failed("samples have inconsistent or zero dimensionality").into());
        }
        if self.config.clusters == 0 {
            return Err(Self::fit_failed("cluster count is zero").into());
        }

        let result = kmeans::fit(
            &points,
            KMeansParams {
                k: self.config.clusters,
                max_iterations: self.config.max_iterations,
                tolerance: self.config.tolerance,
                seed: self.config.seed,
            },
        );
        let k = result.centroids.len();
        info!(
            samples = samples.len(),
            distinct = points.len(),
            clusters = k,
            iterations = result.iterations,
            converged = result.converged,
            "quantizer fitted"
        );

        self.install(ClusterSpace {
            centroids: result.centroids,
            dimensions,
            seed: self.config.seed,
            fitted_at: Utc::now(),
        })?;
        Ok(k)
    }

    /// Fit from a sample of stored embeddings.
    pub fn fit_from_store(&self, store: &dyn ISegmentStore) -> TesseraResult<usize> {
        let samples = store.sample_embeddings(self.config.sample_size)?;
        self.fit(&samples)
    }

    fn install(&self, space: ClusterSpace) -> TesseraResult<()> {
        let mut guard = self.space.write().map_err(|_| RetrievalError::LockPoisoned {
            component: "quantizer".to_string(),
        })?;
        *guard = Some(Arc::new(space));
        Ok(())
    }

    fn current(&self) -> Option<Arc<ClusterSpace>> {
        // A poisoned lock still holds a complete Arc; read through it.
        let guard = self.space.read().unwrap_or_else(|e| e.into_inner());
        guard.clone()
    }

    /// Cluster for a query embedding. Cluster 0 while unfitted or when the
    /// embedding does not match the partition's dimensionality.
    pub fn assign(&self, embedding: &[f32]) -> ClusterId {
        match self.current() {
            Some(space) if space.dimensions == embedding.len() => space.assign(embedding),
            Some(space) => {
                warn!(
                    expected = space.dimensions,
                    actual = embedding.len(),
                    "embedding does not match partition; using default cluster"
                );
                DEFAULT_CLUSTER
            }
            None => DEFAULT_CLUSTER,
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.current().is_some()
    }

    /// Number of clusters; 1 (the default cluster) while unfitted.
    pub fn cluster_count(&self) -> usize {
        self.current().map_or(1, |s| s.len())
    }

    /// Copy of the current partition for persistence.
    pub fn snapshot(&self) -> Option<ClusterSpace> {
        self.current().map(|s| (*s).clone())
    }

    /// Install a previously saved partition.
    pub fn restore(&self, space: ClusterSpace) -> TesseraResult<()> {
        if space.is_empty() || space.centroids.iter().any(|c| c.len() != space.dimensions) {
            return Err(Self::fit_failed("restored partition is empty or inconsistent").into());
        }
        self.install(space)
    }
}

impl Default for QueryQuantizer {
    fn default() -> Self {
        Self::new(QuantizerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quantizer(k: usize) -> QueryQuantizer {
        QueryQuantizer::new(QuantizerConfig {
            clusters: k,
            ..Default::default()
        })
    }

    #[test]
    fn unfitted_assigns_default_cluster() {
        let q = quantizer(4);
        assert!(!q.is_fitted());
        assert_eq!(q.assign(&[1.0, 2.0]), 0);
        assert_eq!(q.cluster_count(), 1);
    }

    #[test]
    fn empty_sample_fails() {
        assert!(quantizer(4).fit(&[]).is_err());
    }

    #[test]
    fn snapshot_restore_round_trip() {
        let q = quantizer(2);
        q.fit(&[vec![0.0, 0.0], vec![5.0, 5.0], vec![5.1, 5.0]]).unwrap();
        let snap = q.snapshot().unwrap();
        let json = serde_json::to_string(&snap).unwrap();

        let other = quantizer(2);
        other.restore(serde_json::from_str(&json).unwrap()).unwrap();
        assert_eq!(other.assign(&[5.0, 5.1]), q.assign(&[5.0, 5.1]));
        assert_eq!(other.cluster_count(), 2);
    }

    #[test]
    fn wrong_dimensions_fall_back_to_default() {
        let q = quantizer(2);
        q.fit(&[vec![0.0, 0.0], vec![5.0, 5.0]]).unwrap();
        assert_eq!(q.assign(&[1.0, 2.0, 3.0]), 0);
    }
}
