//! Run metadata structures

use serde::{Deserialize, Serialize};

/// Diagnostics recorded while running the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Crate version that produced the result
    pub algorithm_version: String,

    /// Wall-clock processing time in milliseconds
    pub processing_time_ms: f64,

    /// Seed used for NMF initialization and k-means restarts
    pub seed: u64,

    /// NMF iterations actually performed
    pub iterations_run: usize,

    /// NMF stopped before its budget because of the tolerance check
    pub stopped_early: bool,

    /// Frobenius norm of the magnitude spectrogram
    pub magnitude_norm: f64,

    /// Frobenius norm `‖V − W@H‖`
    pub reconstruction_error: f64,

    /// Within-cluster sum of squares of the chosen partition
    pub inertia: f64,
}

impl Default for RunMetadata {
    fn default() -> Self {
        Self {
            algorithm_version: env!("CARGO_PKG_VERSION").to_string(),
            processing_time_ms: 0.0,
            seed: 0,
            iterations_run: 0,
            stopped_early: false,
            magnitude_norm: 0.0,
            reconstruction_error: 0.0,
            inertia: 0.0,
        }
    }
}
