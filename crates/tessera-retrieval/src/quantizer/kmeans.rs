//! Seeded k-means with k-means++ initialisation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tessera_core::vector::squared_euclidean;

/// Fit parameters.
#[derive(Debug, Clone, Copy)]
pub struct KMeansParams {
    pub k: usize,
    pub max_iterations: usize,
    pub tolerance: f64,
    pub seed: u64,
}

/// Result of a fit.
#[derive(Debug, Clone)]
pub struct KMeansFit {
    pub centroids: Vec<Vec<f32>>,
    pub iterations: usize,
    pub converged: bool,
}

/// Distinct points, first occurrence order.
pub fn distinct_points(samples: &[Vec<f32>]) -> Vec<&[f32]> {
    let mut seen = std::collections::HashSet::new();
    samples
        .iter()
        .filter(|s| seen.insert(s.iter().map(|x| x.to_bits()).collect::<Vec<u32>>()))
        .map(|s| s.as_slice())
        .collect()
}

/// Index of the nearest centroid; ties go to the lowest index.
pub fn nearest(centroids: &[Vec<f32>], point: &[f32]) -> usize {
    let mut best = 0;
    let mut best_d = f64::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let d = squared_euclidean(c, point);
        if d < best_d {
            best_d = d;
            best = i;
        }
    }
    best
}

fn plus_plus_init(points: &[&[f32]], k: usize, rng: &mut StdRng) -> Vec<Vec<f32>> {
    let mut centroids: Vec<Vec<f32>> = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..points.len())].to_vec());

    let mut dist: Vec<f64> = points
        .iter()
        .map(|p| squared_euclidean(&centroids[0], p))
        .collect();

    while centroids.len() < k {
        let total: f64 = dist.iter().sum();
        let next = if total > 0.0 {
            let mut target = rng.gen_range(0.0..total);
            let mut chosen = dist.len() - 1;
            for (i, d) in dist.iter().enumerate() {
                if target < *d {
                    chosen = i;
                    break;
                }
                target -= d;
            }
            chosen
        } else {
            // Only reachable if points coincide, which distinct input rules out.
            rng.gen_range(0..points.len())
        };
        let c = points[next].to_vec();
        for (d, p) in dist.iter_mut().zip(points) {
            *d = d.min(squared_euclidean(&c, p));
        }
        centroids.push(c);
    }
    centroids
}

/// Lloyd iterations from k-means++ seeds. `points` must be non-empty,
/// distinct and of equal length; `params.k` is clamped to `points.len()`.
pub fn fit(points: &[&[f32]], params: KMeansParams) -> KMeansFit {
    let k = params.k.clamp(1, points.len());
    let dims = points[0].len();
    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut centroids = plus_plus_init(points, k, &mut rng);

    let mut iterations = 0;
    let mut converged = false;
    while iterations < params.max_iterations {
        iterations += 1;

        let mut sums = vec![vec![0.0f64; dims]; k];
        let mut counts = vec![0usize; k];
        for p in points {
            let c = nearest(&centroids, p);
            counts[c] += 1;
            for (s, x) in sums[c].iter_mut().zip(p.iter()) {
                *s += *x as f64;
            }
        }

        let mut max_shift = 0.0f64;
        for (i, centroid) in centroids.iter_mut().enumerate() {
            // Empty clusters keep their previous centroid.
            if counts[i] == 0 {
                continue;
            }
            let n = counts[i] as f64;
            let updated: Vec<f32> = sums[i].iter().map(|s| (s / n) as f32).collect();
            max_shift = max_shift.max(squared_euclidean(centroid, &updated).sqrt());
            *centroid = updated;
        }

        if max_shift <= params.tolerance {
            converged = true;
            break;
        }
    }

    KMeansFit {
        centroids,
        iterations,
        converged,
    }
}
