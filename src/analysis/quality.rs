//! Quality scoring module
//!
//! Summarizes how trustworthy a separation run looks. There is no ground
//! truth, so these are internal consistency checks only:
//!
//! 1. **Relative reconstruction error**: `‖V − W@H‖ / ‖V‖`
//! 2. **Cluster balance**: minority count / majority count (0 when a group is empty)
//! 3. **Flags** for specific issues
//!
//! # Example
//!
//! ```no_run
//! use sound_separator::{separate_file, SeparationConfig};
//! use sound_separator::analysis::quality::assess;
//! use std::path::Path;
//!
//! let result = separate_file(Path::new("recording.wav"), &SeparationConfig::default(), None)?;
//! let quality = assess(&result);
//! println!("Relative error: {:.3}", quality.relative_reconstruction_error);
//! # Ok::<(), sound_separator::SeparationError>(())
//! ```

use super::result::SeparationResult;
use serde::{Deserialize, Serialize};

/// Relative reconstruction error above which a run is flagged
pub const HIGH_ERROR_THRESHOLD: f64 = 0.5;

/// Quality issues detected in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityFlag {
    /// One of the two groups has no frames
    EmptyCluster,
    /// `W@H` explains little of the spectrogram
    HighReconstructionError,
    /// NMF stopped before its iteration budget
    StoppedEarly,
}

/// Quality scores for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeparationQuality {
    /// `‖V − W@H‖ / ‖V‖` (0 when the spectrogram is silent)
    pub relative_reconstruction_error: f64,

    /// Ratio of the smaller cluster to the larger one, in [0, 1]
    pub cluster_balance: f64,

    /// Detected issues
    pub flags: Vec<QualityFlag>,
}

/// Compute quality scores for a separation result
pub fn assess(result: &SeparationResult) -> SeparationQuality {
    let metadata = &result.metadata;
    let relative_reconstruction_error = if metadata.magnitude_norm > 0.0 {
        metadata.reconstruction_error / metadata.magnitude_norm
    } else {
        0.0
    };

    let summary = &result.summary;
    let smaller = summary.cluster_0_count.min(summary.cluster_1_count);
    let larger = summary.cluster_0_count.max(summary.cluster_1_count);
    let cluster_balance = if larger > 0 {
        smaller as f64 / larger as f64
    } else {
        0.0
    };

    let mut flags = Vec::new();
    if smaller == 0 {
        flags.push(QualityFlag::EmptyCluster);
    }
    if relative_reconstruction_error > HIGH_ERROR_THRESHOLD {
        flags.push(QualityFlag::HighReconstructionError);
    }
    if metadata.stopped_early {
        flags.push(QualityFlag::StoppedEarly);
    }

    log::debug!(
        "Quality: relative error={:.4}, balance={:.3}, flags={:?}",
        relative_reconstruction_error,
        cluster_balance,
        flags
    );

    SeparationQuality {
        relative_reconstruction_error,
        cluster_balance,
        flags,
    }
}
