//! Separation result types

use super::metadata::RunMetadata;
use super::summary::ProcessingSummary;
use crate::features::clustering::ClusterAssignment;
use ndarray::Array2;

/// Everything a run hands back to its caller
///
/// Matrices are owned by the result; nothing is shared with other runs.
#[derive(Debug, Clone)]
pub struct SeparationResult {
    /// Basis matrix `W` (frequency bins × components)
    pub w: Array2<f64>,

    /// Activation matrix `H` (components × frames)
    pub h: Array2<f64>,

    /// Decibel spectrogram for display (frequency bins × frames)
    pub decibels: Array2<f64>,

    /// Cluster label per frame
    pub labels: ClusterAssignment,

    /// Shapes, counts and hyperparameters
    pub summary: ProcessingSummary,

    /// Timing and convergence diagnostics
    pub metadata: RunMetadata,
}

impl SeparationResult {
    /// Frame indices carrying `label`
    pub fn frames_with_label(&self, label: u8) -> Vec<usize> {
        self.labels
            .labels()
            .iter()
            .enumerate()
            .filter(|&(_, &l)| l == label)
            .map(|(i, _)| i)
            .collect()
    }

    /// Centre time in seconds of each frame (`i * hop / sample_rate`)
    pub fn frame_times(&self) -> Vec<f64> {
        let hop = crate::features::spectrogram::HOP_LENGTH as f64;
        let sample_rate = self.summary.sample_rate as f64;
        (0..self.h.ncols())
            .map(|i| i as f64 * hop / sample_rate)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::clustering::{cluster, KMeansParams};
    use ndarray::array;

    fn alternating_result() -> SeparationResult {
        let h = array![[0.0, 1.0, 0.0, 1.0, 0.0], [1.0, 0.0, 1.0, 0.0, 1.0]];
        SeparationResult {
            w: Array2::zeros((513, 2)),
            labels: cluster(&h, &KMeansParams::default()).unwrap(),
            h,
            decibels: Array2::zeros((513, 5)),
            summary: ProcessingSummary {
                sample_rate: 16_000,
                duration: 0.128,
                n_components: 2,
                max_iterations: 100,
                w_shape: (513, 2),
                h_shape: (2, 5),
                d_shape: (513, 5),
                cluster_0_count: 3,
                cluster_1_count: 2,
                cluster_ratio: 0.6,
            },
            metadata: RunMetadata::default(),
        }
    }

    #[test]
    fn test_frames_with_label_partitions_frames() {
        let result = alternating_result();
        let first = result.labels.labels()[0];
        let other = 1 - first;

        assert_eq!(result.frames_with_label(first), vec![0, 2, 4]);
        assert_eq!(result.frames_with_label(other), vec![1, 3]);
        assert!(result.frames_with_label(7).is_empty());
    }

    #[test]
    fn test_frame_times_step_by_hop() {
        let result = alternating_result();
        let times = result.frame_times();

        assert_eq!(times.len(), 5);
        assert_eq!(times[0], 0.0);
        assert!((times[1] - 512.0 / 16_000.0).abs() < 1e-12);
        assert!((times[4] - 4.0 * 512.0 / 16_000.0).abs() < 1e-12);
    }
}
