//! Single Lloyd's k-means run with k-means++ seeding

use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::Rng;

/// Outcome of one k-means run
#[derive(Debug, Clone)]
pub struct KMeansRun {
    /// Cluster index per point
    pub labels: Vec<usize>,

    /// Centroids (n_clusters × dims)
    pub centroids: Array2<f64>,

    /// Sum of squared distances from each point to its centroid
    pub inertia: f64,

    /// Lloyd iterations performed
    pub iterations: usize,
}

/// Squared Euclidean distance
pub fn squared_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// k-means++ seeding: first centroid uniform, the rest with probability
/// proportional to the squared distance to the nearest chosen centroid
pub fn kmeans_plus_plus<R: Rng>(
    points: ArrayView2<f64>,
    n_clusters: usize,
    rng: &mut R,
) -> Array2<f64> {
    let n_points = points.nrows();
    let mut centroids = Array2::<f64>::zeros((n_clusters, points.ncols()));

    let first = rng.random_range(0..n_points);
    centroids.row_mut(0).assign(&points.row(first));

    let mut nearest: Vec<f64> = points
        .rows()
        .into_iter()
        .map(|p| squared_distance(p, centroids.row(0)))
        .collect();

    for c in 1..n_clusters {
        let total: f64 = nearest.iter().sum();
        let chosen = if total > 0.0 {
            let target = rng.random::<f64>() * total;
            let mut cumulative = 0.0;
            nearest
                .iter()
                .position(|&d| {
                    cumulative += d;
                    cumulative > target
                })
                .unwrap_or(n_points - 1)
        } else {
            // Every point coincides with a chosen centroid
            rng.random_range(0..n_points)
        };

        centroids.row_mut(c).assign(&points.row(chosen));

        for (d, p) in nearest.iter_mut().zip(points.rows()) {
            *d = d.min(squared_distance(p, centroids.row(c)));
        }
    }

    centroids
}

/// Assign each point to its nearest centroid (ties go to the lower index)
fn assign(points: ArrayView2<f64>, centroids: &Array2<f64>, labels: &mut [usize]) -> f64 {
    let mut inertia = 0.0;
    for (label, p) in labels.iter_mut().zip(points.rows()) {
        let mut best = 0;
        let mut best_distance = f64::INFINITY;
        for (j, c) in centroids.rows().into_iter().enumerate() {
            let d = squared_distance(p, c);
            if d < best_distance {
                best = j;
                best_distance = d;
            }
        }
        *label = best;
        inertia += best_distance;
    }
    inertia
}

/// Move points into empty clusters
///
/// Each empty cluster takes the point farthest from its current centroid,
/// drawn from clusters that still have more than one member. Returns `false`
/// if some cluster stays empty because all points coincide with their
/// centroids.
fn fill_empty_clusters(
    points: ArrayView2<f64>,
    centroids: &Array2<f64>,
    labels: &mut [usize],
    counts: &mut [usize],
) -> bool {
    let mut all_filled = true;

    for empty in 0..counts.len() {
        if counts[empty] > 0 {
            continue;
        }

        let farthest = (0..labels.len())
            .filter(|&i| counts[labels[i]] > 1)
            .map(|i| (i, squared_distance(points.row(i), centroids.row(labels[i]))))
            .filter(|&(_, d)| d > 0.0)
            .max_by(|a, b| a.1.total_cmp(&b.1));

        match farthest {
            Some((i, _)) => {
                counts[labels[i]] -= 1;
                labels[i] = empty;
                counts[empty] = 1;
            }
            None => all_filled = false,
        }
    }

    all_filled
}

/// Run Lloyd's algorithm from k-means++ seeds
///
/// # Arguments
///
/// * `points` - One point per row
/// * `n_clusters` - Number of clusters (<= number of points)
/// * `max_iterations` - Upper bound on Lloyd iterations
/// * `tolerance` - Stop once the summed squared centroid shift is at most this
/// * `rng` - Seeding randomness
pub fn lloyd<R: Rng>(
    points: ArrayView2<f64>,
    n_clusters: usize,
    max_iterations: usize,
    tolerance: f64,
    rng: &mut R,
) -> KMeansRun {
    let n_points = points.nrows();
    let dims = points.ncols();

    let mut centroids = kmeans_plus_plus(points, n_clusters, rng);
    let mut labels = vec![0usize; n_points];
    let mut iterations = 0;

    for _ in 0..max_iterations {
        iterations += 1;
        assign(points, &centroids, &mut labels);

        let mut counts = vec![0usize; n_clusters];
        for &label in &labels {
            counts[label] += 1;
        }

        if counts.contains(&0) && !fill_empty_clusters(points, &centroids, &mut labels, &mut counts) {
            log::trace!("k-means: empty cluster could not be refilled (coincident points)");
        }

        let mut sums = Array2::<f64>::zeros((n_clusters, dims));
        for (&label, p) in labels.iter().zip(points.rows()) {
            let mut row = sums.row_mut(label);
            row += &p;
        }

        let mut shift = 0.0;
        for (j, &count) in counts.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let mean = sums.row(j).mapv(|s| s / count as f64);
            shift += squared_distance(mean.view(), centroids.row(j));
            centroids.row_mut(j).assign(&mean);
        }

        if shift <= tolerance {
            break;
        }
    }

    let inertia = assign(points, &centroids, &mut labels);

    KMeansRun {
        labels,
        centroids,
        inertia,
        iterations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_two_obvious_groups() {
        let points = array![[0.0, 0.0], [0.1, 0.1], [0.0, 0.2], [10.0, 10.0], [10.1, 9.9], [9.8, 10.2]];
        let mut rng = StdRng::seed_from_u64(0);
        let run = lloyd(points.view(), 2, 100, 1e-12, &mut rng);

        assert_eq!(run.labels[0], run.labels[1]);
        assert_eq!(run.labels[1], run.labels[2]);
        assert_eq!(run.labels[3], run.labels[4]);
        assert_eq!(run.labels[4], run.labels[5]);
        assert_ne!(run.labels[0], run.labels[3]);
        assert!(run.inertia < 1.0);
    }

    #[test]
    fn test_identical_points_accepted() {
        let points = Array2::<f64>::ones((5, 3));
        let mut rng = StdRng::seed_from_u64(1);
        let run = lloyd(points.view(), 2, 50, 0.0, &mut rng);

        assert_eq!(run.labels, vec![0; 5]);
        assert_eq!(run.inertia, 0.0);
    }

    #[test]
    fn test_plus_plus_picks_distinct_points() {
        let points = array![[0.0], [0.0], [0.0], [5.0]];
        let mut rng = StdRng::seed_from_u64(4);
        let centroids = kmeans_plus_plus(points.view(), 2, &mut rng);
        assert_ne!(centroids[[0, 0]], centroids[[1, 0]]);
    }

    #[test]
    fn test_fill_empty_cluster_takes_farthest() {
        let points = array![[0.0], [1.0], [9.0]];
        let centroids = array![[1.0], [100.0]];
        let mut labels = vec![0, 0, 0];
        let mut counts = vec![3, 0];
        assert!(fill_empty_clusters(points.view(), &centroids, &mut labels, &mut counts));
        assert_eq!(labels, vec![0, 0, 1]);
        assert_eq!(counts, vec![2, 1]);
    }
}
