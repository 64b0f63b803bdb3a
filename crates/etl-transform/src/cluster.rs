//! Seeded k-means clustering.
//!
//! Centroids are seeded with k-means++ from a [`StdRng`] so a given seed
//! always yields the same partition. The best of `n_init` restarts (lowest
//! inertia) is kept.
//!
//! Points with very large coordinates are scaled down uniformly before
//! fitting. A uniform scale leaves the partition unchanged and keeps squared
//! distances finite.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Coordinates above this magnitude trigger rescaling; squared distances
/// between such points could overflow.
const RESCALE_ABOVE: f64 = 1e100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KMeans {
    pub n_clusters: usize,
    pub seed: u64,
    pub n_init: usize,
    pub max_iter: usize,
}

impl KMeans {
    pub fn new(n_clusters: usize, seed: u64) -> Self {
        Self {
            n_clusters,
            seed,
            n_init: 10,
            max_iter: 300,
        }
    }

    /// Cluster index for every point. `k` is clamped to `1..=points.len()`;
    /// an empty input yields an empty assignment.
    pub fn fit_predict(&self, points: &[Vec<f64>]) -> Vec<usize> {
        if points.is_empty() {
            return Vec::new();
        }
        let k = self.n_clusters.clamp(1, points.len());
        let rescaled = rescale(points);
        let points = rescaled.as_deref().unwrap_or(points);
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut best: Option<(f64, Vec<usize>)> = None;
        for _ in 0..self.n_init.max(1) {
            let centroids = seed_centroids(points, k, &mut rng);
            let (assignments, inertia) = self.lloyd(points, centroids);
            if best
                .as_ref()
                .is_none_or(|(best_inertia, _)| inertia < *best_inertia)
            {
                best = Some((inertia, assignments));
            }
        }
        let (inertia, assignments) = best.unwrap_or_default();
        debug!(points = points.len(), k, inertia, "k-means converged");
        assignments
    }

    fn lloyd(&self, points: &[Vec<f64>], mut centroids: Vec<Vec<f64>>) -> (Vec<usize>, f64) {
        let mut assignments = assign(points, &centroids);
        for _ in 0..self.max_iter {
            centroids = update_centroids(points, &assignments, centroids);
            let next = assign(points, &centroids);
            if next == assignments {
                break;
            }
            assignments = next;
        }
        let inertia = points
            .iter()
            .zip(&assignments)
            .map(|(point, &cluster)| squared_distance(point, &centroids[cluster]))
            .sum();
        (assignments, inertia)
    }
}

/// Points divided by their largest absolute coordinate, when that exceeds
/// [`RESCALE_ABOVE`].
fn rescale(points: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let scale = points
        .iter()
        .flatten()
        .fold(0.0, |acc: f64, v| acc.max(v.abs()));
    if scale <= RESCALE_ABOVE || !scale.is_finite() {
        return None;
    }
    debug!(scale, "rescaling k-means input");
    Some(
        points
            .iter()
            .map(|point| point.iter().map(|v| v / scale).collect())
            .collect(),
    )
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Nearest centroid per point; ties go to the lower index.
fn assign(points: &[Vec<f64>], centroids: &[Vec<f64>]) -> Vec<usize> {
    points
        .iter()
        .map(|point| {
            let mut nearest = 0;
            let mut nearest_distance = f64::INFINITY;
            for (idx, centroid) in centroids.iter().enumerate() {
                let distance = squared_distance(point, centroid);
                if distance < nearest_distance {
                    nearest = idx;
                    nearest_distance = distance;
                }
            }
            nearest
        })
        .collect()
}

/// Mean of each cluster's members. A cluster that lost all its members keeps
/// its previous centroid.
fn update_centroids(
    points: &[Vec<f64>],
    assignments: &[usize],
    previous: Vec<Vec<f64>>,
) -> Vec<Vec<f64>> {
    let dims = points.first().map_or(0, Vec::len);
    let mut sums = vec![vec![0.0; dims]; previous.len()];
    let mut counts = vec![0usize; previous.len()];
    for (point, &cluster) in points.iter().zip(assignments) {
        counts[cluster] += 1;
        for (sum, value) in sums[cluster].iter_mut().zip(point) {
            *sum += value;
        }
    }
    previous
        .into_iter()
        .zip(sums.into_iter().zip(counts))
        .map(|(old, (sum, count))| {
            if count == 0 {
                old
            } else {
                sum.into_iter().map(|s| s / count as f64).collect()
            }
        })
        .collect()
}

/// k-means++ seeding: each further centroid is drawn with probability
/// proportional to its squared distance from the nearest chosen one.
fn seed_centroids(points: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..points.len())].clone());
    let mut distances: Vec<f64> = points
        .iter()
        .map(|point| squared_distance(point, &centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: f64 = distances.iter().sum();
        let chosen = if !total.is_finite() {
            farthest(&distances)
        } else if total > 0.0 {
            let target = rng.gen_range(0.0..total);
            let mut cumulative = 0.0;
            let mut chosen = points.len() - 1;
            for (idx, distance) in distances.iter().enumerate() {
                cumulative += distance;
                if target < cumulative {
                    chosen = idx;
                    break;
                }
            }
            chosen
        } else {
            // All remaining points coincide with a centroid.
            rng.gen_range(0..points.len())
        };
        let centroid = points[chosen].clone();
        for (distance, point) in distances.iter_mut().zip(points) {
            *distance = distance.min(squared_distance(point, &centroid));
        }
        centroids.push(centroid);
    }
    centroids
}

/// Index of the largest distance; the first one on ties.
fn farthest(distances: &[f64]) -> usize {
    distances
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(best, best_distance), (idx, &distance)| {
            if distance > best_distance {
                (idx, distance)
            } else {
                (best, best_distance)
            }
        })
        .0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blobs() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 0.0],
            vec![0.2, 0.1],
            vec![0.1, 0.3],
            vec![10.0, 10.0],
            vec![10.2, 9.9],
            vec![9.8, 10.1],
        ]
    }

    #[test]
    fn separates_distinct_groups() {
        let assignments = KMeans::new(2, 42).fit_predict(&blobs());
        assert_eq!(assignments.len(), 6);
        assert_eq!(assignments[0], assignments[1]);
        assert_eq!(assignments[1], assignments[2]);
        assert_eq!(assignments[3], assignments[4]);
        assert_eq!(assignments[4], assignments[5]);
        assert_ne!(assignments[0], assignments[3]);
    }

    #[test]
    fn same_seed_same_partition() {
        let points: Vec<Vec<f64>> = (0..30)
            .map(|i| vec![f64::from(i % 7), f64::from(i % 5) * 2.0])
            .collect();
        let first = KMeans::new(4, 7).fit_predict(&points);
        let second = KMeans::new(4, 7).fit_predict(&points);
        assert_eq!(first, second);
    }

    #[test]
    fn k_is_clamped_to_point_count() {
        let points = vec![vec![1.0], vec![5.0]];
        let assignments = KMeans::new(5, 42).fit_predict(&points);
        assert_eq!(assignments.len(), 2);
        assert!(assignments.iter().all(|&c| c < 2));
        assert!(KMeans::new(3, 1).fit_predict(&[]).is_empty());
    }

    #[test]
    fn identical_points_share_a_cluster() {
        let points = vec![vec![3.0, 3.0]; 4];
        let assignments = KMeans::new(3, 42).fit_predict(&points);
        assert!(assignments.iter().all(|&c| c == assignments[0]));
    }

    #[test]
    fn huge_coordinates_still_partition() {
        let points = vec![vec![1e200], vec![-1e200], vec![0.0]];
        let assignments = KMeans::new(2, 42).fit_predict(&points);
        assert_eq!(assignments.len(), 3);
        assert!(assignments.iter().all(|&c| c < 2));
        assert_ne!(assignments[0], assignments[1]);
    }

    #[test]
    fn overflowing_seed_weights_pick_the_farthest_point() {
        let points = vec![vec![0.0], vec![1e300], vec![-1e300]];
        let mut rng = StdRng::seed_from_u64(3);
        let centroids = seed_centroids(&points, 3, &mut rng);
        assert_eq!(centroids.len(), 3);
        assert!(centroids.iter().flatten().all(|v| v.is_finite()));
        assert_eq!(farthest(&[1.0, f64::INFINITY, f64::INFINITY]), 1);
    }
}
