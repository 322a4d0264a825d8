//! Two-way clustering of NMF activations
//!
//! Every column of `H` (one frame, `k` activation weights) is a point in
//! k-dimensional space. The frames are split into two groups with Lloyd's
//! k-means, restarted `n_init` times from k-means++ seeds; the run with the
//! lowest inertia wins.
//!
//! Restart `r` uses `StdRng::seed_from_u64(seed + r)`, so the result does not
//! depend on how rayon schedules the restarts. Label identity (which group is
//! `0`) carries no meaning.
//!
//! # Empty clusters
//!
//! A cluster that empties during Lloyd iterations is re-seeded with the point
//! farthest from its centroid. When every point is identical that is
//! impossible; the single-cluster result is accepted (all labels `0`) and a
//! warning is logged.

pub mod kmeans;

use crate::error::{Result, SeparationError};
use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Number of groups the activations are split into
pub const N_CLUSTERS: usize = 2;

/// Minimum number of k-means restarts
pub const MIN_RESTARTS: usize = 10;

/// k-means parameters
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansParams {
    /// Independent restarts (>= 10)
    pub n_init: usize,

    /// Lloyd iterations per restart
    pub max_iterations: usize,

    /// Convergence threshold, relative to the mean per-feature variance
    pub tolerance: f64,

    /// Base seed; restart `r` uses `seed + r`
    pub seed: u64,
}

impl Default for KMeansParams {
    fn default() -> Self {
        Self {
            n_init: MIN_RESTARTS,
            max_iterations: 300,
            tolerance: 1e-4,
            seed: 0,
        }
    }
}

impl KMeansParams {
    /// Validate parameter ranges
    pub fn validate(&self) -> Result<()> {
        if self.n_init < MIN_RESTARTS {
            return Err(SeparationError::InvalidInput(format!(
                "k-means needs at least {} restarts, got {}",
                MIN_RESTARTS, self.n_init
            )));
        }

        if self.max_iterations == 0 {
            return Err(SeparationError::InvalidInput(
                "k-means max_iterations must be > 0".to_string(),
            ));
        }

        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(SeparationError::InvalidInput(format!(
                "k-means tolerance must be non-negative, got {}",
                self.tolerance
            )));
        }

        Ok(())
    }
}

/// One label (0 or 1) per column of `H`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    labels: Vec<u8>,
    #[serde(skip)]
    centroids: Array2<f64>,
    inertia: f64,
}

impl ClusterAssignment {
    /// Label per frame
    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    /// Number of labelled frames
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True when no frames were labelled
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Frames per label: `[count(0), count(1)]`
    pub fn counts(&self) -> [usize; N_CLUSTERS] {
        let mut counts = [0usize; N_CLUSTERS];
        for &label in &self.labels {
            counts[label as usize] += 1;
        }
        counts
    }

    /// True if one of the two groups has no frames
    pub fn has_empty_cluster(&self) -> bool {
        self.counts().contains(&0)
    }

    /// Within-cluster sum of squared distances of the winning run
    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    /// Cluster centroids (2 × k)
    pub fn centroids(&self) -> &Array2<f64> {
        &self.centroids
    }
}

/// Cluster the columns of `h` into two groups
///
/// # Errors
///
/// - `DegenerateInput` if `h` has fewer than 2 columns or no rows
/// - `NumericInstability` if `h` has non-finite entries
/// - `InvalidInput` for invalid `params`
pub fn cluster(h: &Array2<f64>, params: &KMeansParams) -> Result<ClusterAssignment> {
    let (dims, n_points) = h.dim();

    if n_points < N_CLUSTERS {
        return Err(SeparationError::DegenerateInput(format!(
            "Need at least {} frames to form {} clusters, got {}",
            N_CLUSTERS, N_CLUSTERS, n_points
        )));
    }

    if dims == 0 {
        return Err(SeparationError::DegenerateInput(
            "Activation matrix has no components".to_string(),
        ));
    }

    params.validate()?;

    if h.iter().any(|x| !x.is_finite()) {
        return Err(SeparationError::NumericInstability(
            "Activation matrix contains non-finite values".to_string(),
        ));
    }

    let points = h.t().to_owned();
    let absolute_tolerance = params.tolerance * mean_variance(&points);

    log::debug!(
        "Clustering {} frames of {} activations: {} restarts, max_iterations={}",
        n_points,
        dims,
        params.n_init,
        params.max_iterations
    );

    let runs: Vec<kmeans::KMeansRun> = (0..params.n_init)
        .into_par_iter()
        .map(|restart| {
            let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(restart as u64));
            kmeans::lloyd(
                points.view(),
                N_CLUSTERS,
                params.max_iterations,
                absolute_tolerance,
                &mut rng,
            )
        })
        .collect();

    // min_by keeps the first of equal minima, i.e. the lowest restart index
    let best = runs
        .into_iter()
        .min_by(|a, b| a.inertia.total_cmp(&b.inertia))
        .ok_or_else(|| SeparationError::InvalidInput("no k-means restarts ran".to_string()))?;

    let assignment = ClusterAssignment {
        labels: best.labels.iter().map(|&l| l as u8).collect(),
        centroids: best.centroids,
        inertia: best.inertia,
    };

    let counts = assignment.counts();
    if assignment.has_empty_cluster() {
        log::warn!(
            "k-means produced an empty cluster ({} vs {} frames); all activation columns coincide",
            counts[0],
            counts[1]
        );
    }

    log::debug!(
        "Clustering done: {} / {} frames, inertia={:.6}, {} Lloyd iterations",
        counts[0],
        counts[1],
        assignment.inertia,
        best.iterations
    );

    Ok(assignment)
}

fn mean_variance(points: &Array2<f64>) -> f64 {
    points
        .var_axis(Axis(0), 0.0)
        .mean()
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    /// Columns 0..half near (1, 0), the rest near (0, 1)
    fn separated_activations(cols: usize) -> Array2<f64> {
        Array2::from_shape_fn((2, cols), |(r, c)| {
            let jitter = ((c * 31 + r * 17) % 7) as f64 * 0.01;
            let on = (c < cols / 2) == (r == 0);
            if on {
                1.0 + jitter
            } else {
                jitter
            }
        })
    }

    #[test]
    fn test_labels_cover_every_column() {
        let h = separated_activations(40);
        let assignment = cluster(&h, &KMeansParams::default()).unwrap();

        assert_eq!(assignment.len(), 40);
        assert!(assignment.labels().iter().all(|&l| l <= 1));
        let counts = assignment.counts();
        assert_eq!(counts[0] + counts[1], 40);
        assert_eq!(assignment.centroids().dim(), (2, 2));
    }

    #[test]
    fn test_recovers_two_groups() {
        let h = separated_activations(30);
        let assignment = cluster(&h, &KMeansParams::default()).unwrap();
        let labels = assignment.labels();

        assert!(labels[..15].iter().all(|&l| l == labels[0]));
        assert!(labels[15..].iter().all(|&l| l == labels[15]));
        assert_ne!(labels[0], labels[15]);
    }

    #[test]
    fn test_deterministic() {
        let h = Array2::from_shape_fn((3, 25), |(r, c)| ((r * 13 + c * 7) % 11) as f64);
        let params = KMeansParams {
            seed: 17,
            ..KMeansParams::default()
        };
        let a = cluster(&h, &params).unwrap();
        let b = cluster(&h, &params).unwrap();
        assert_eq!(a.labels(), b.labels());
        assert_eq!(a.inertia(), b.inertia());
    }

    #[test]
    fn test_too_few_columns() {
        let h = array![[1.0], [2.0]];
        let result = cluster(&h, &KMeansParams::default());
        assert!(matches!(result, Err(SeparationError::DegenerateInput(_))));

        let h = Array2::<f64>::zeros((2, 0));
        let result = cluster(&h, &KMeansParams::default());
        assert!(matches!(result, Err(SeparationError::DegenerateInput(_))));
    }

    #[test]
    fn test_identical_columns_give_degenerate_partition() {
        let h = Array2::<f64>::ones((4, 10));
        let assignment = cluster(&h, &KMeansParams::default()).unwrap();
        assert!(assignment.has_empty_cluster());
        assert_eq!(assignment.counts(), [10, 0]);
    }

    #[test]
    fn test_two_points_split() {
        let h = array![[0.0, 5.0], [0.0, 5.0]];
        let assignment = cluster(&h, &KMeansParams::default()).unwrap();
        assert_ne!(assignment.labels()[0], assignment.labels()[1]);
        assert_eq!(assignment.inertia(), 0.0);
    }

    #[test]
    fn test_non_finite_rejected() {
        let h = array![[0.0, f64::NAN, 1.0], [1.0, 1.0, 1.0]];
        assert!(matches!(
            cluster(&h, &KMeansParams::default()),
            Err(SeparationError::NumericInstability(_))
        ));
    }

    #[test]
    fn test_too_few_restarts_rejected() {
        let h = separated_activations(10);
        let params = KMeansParams {
            n_init: 5,
            ..KMeansParams::default()
        };
        assert!(matches!(
            cluster(&h, &params),
            Err(SeparationError::InvalidInput(_))
        ));
    }
}
