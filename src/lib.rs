//! # Sound Separator
//!
//! Decomposes a recording into non-negative spectral components and splits
//! its frames into two groups, e.g. to pull apart heart and lung sounds in
//! an auscultation recording.
//!
//! ## Features
//!
//! - **Spectrogram**: STFT magnitude (1024-sample Hann frames, 512 hop) and a decibel view
//! - **NMF**: KL multiplicative updates with a fixed iteration budget and seeded init
//! - **Clustering**: two-way k-means over activation columns with 10+ restarts
//! - **Summary**: shapes, cluster counts and ratio for reporting layers
//!
//! ## Quick Start
//!
//! ```no_run
//! use sound_separator::{separate_file, SeparationConfig};
//! use std::path::Path;
//!
//! let config = SeparationConfig {
//!     n_components: 8,
//!     max_iterations: 1000,
//!     ..SeparationConfig::default()
//! };
//!
//! let result = separate_file(Path::new("recording.wav"), &config, None)?;
//!
//! println!("W: {:?}, H: {:?}", result.summary.w_shape, result.summary.h_shape);
//! println!(
//!     "Cluster 0: {} frames, cluster 1: {} frames (ratio {:.2})",
//!     result.summary.cluster_0_count,
//!     result.summary.cluster_1_count,
//!     result.summary.cluster_ratio
//! );
//! # Ok::<(), sound_separator::SeparationError>(())
//! ```
//!
//! ## Architecture
//!
//! Data flows strictly forward; every stage returns new data:
//!
//! ```text
//! Audio file → Waveform → Spectrogram → (W, H) → Cluster labels → Summary
//! ```
//!
//! Cluster labels are arbitrary identifiers: which group is `0` carries no
//! meaning and may change with the seed.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod cancel;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod preprocessing;

// Re-export main types
pub use analysis::metadata::RunMetadata;
pub use analysis::quality::{assess, QualityFlag, SeparationQuality};
pub use analysis::result::SeparationResult;
pub use analysis::summary::{summarize, ProcessingSummary};
pub use cancel::CancelToken;
pub use config::{Hyperparameters, SeparationConfig};
pub use error::{Result, SeparationError};
pub use features::clustering::{cluster, ClusterAssignment, KMeansParams};
pub use features::nmf::{factorize, factorize_seeded, FactorModel, NmfParams};
pub use features::spectrogram::{extract, Spectrogram};
pub use io::{probe_audio_info, AudioInfo, Waveform};

use std::path::Path;
use std::time::Instant;

/// Run the full pipeline on an audio file
///
/// Decodes `path`, resamples it to `config.sample_rate`, and hands the
/// waveform to [`separate_waveform`].
///
/// # Arguments
///
/// * `path` - Audio file readable by Symphonia (WAV, FLAC, MP3, OGG, ...)
/// * `config` - Hyperparameters and tuning knobs
/// * `cancel` - Optional token checked between NMF iterations
///
/// # Errors
///
/// - `InvalidInput` / `DegenerateInput` if `config` is out of range
/// - `AudioLoad` if the file cannot be decoded or is empty
/// - Any error of [`separate_waveform`]
pub fn separate_file(
    path: &Path,
    config: &SeparationConfig,
    cancel: Option<&CancelToken>,
) -> Result<SeparationResult> {
    config.validate()?;

    log::debug!("Separating {}", path.display());

    let waveform = Waveform::load(path, config.sample_rate)?;
    separate_waveform(&waveform, config, cancel)
}

/// Run the full pipeline on an in-memory waveform
///
/// The waveform is resampled first if its rate differs from
/// `config.sample_rate`.
///
/// # Errors
///
/// - `InvalidInput` / `DegenerateInput` if `config` is out of range
/// - `DegenerateInput` if the spectrogram has fewer than two frames
/// - `NumericInstability` if the factorization diverges
/// - `Cancelled` if `cancel` fires
pub fn separate_waveform(
    waveform: &Waveform,
    config: &SeparationConfig,
    cancel: Option<&CancelToken>,
) -> Result<SeparationResult> {
    let start_time = Instant::now();

    config.validate()?;

    log::debug!(
        "Starting separation: {} samples at {} Hz, k={}, max_iterations={}, seed={}",
        waveform.len(),
        waveform.sample_rate(),
        config.n_components,
        config.max_iterations,
        config.seed
    );

    let resampled;
    let waveform = if waveform.sample_rate() == config.sample_rate {
        waveform
    } else {
        resampled = waveform.resampled(config.sample_rate)?;
        &resampled
    };

    // Stage 1: spectrogram
    let spectrogram = Spectrogram::from_waveform(waveform)?;
    let decibels = spectrogram.to_decibels(config.top_db);

    // Stage 2: factorization
    let model = factorize_seeded(
        spectrogram.magnitude(),
        &config.nmf_params(),
        config.seed,
        cancel,
    )?;

    // Stage 3: clustering
    let labels = cluster(model.h(), &config.kmeans_params())?;

    // Stage 4: summary
    let summary = summarize(&spectrogram, &model, &labels, &config.hyperparameters())?;

    let magnitude_norm = spectrogram.magnitude().iter().map(|m| m * m).sum::<f64>().sqrt();
    let reconstruction_error = model.reconstruction_error(spectrogram.magnitude());
    let iterations_run = model.iterations_run();
    let stopped_early = model.stopped_early();
    let inertia = labels.inertia();
    let (w, h) = model.into_parts();

    let processing_time_ms = start_time.elapsed().as_secs_f64() * 1000.0;

    log::debug!(
        "Separation complete in {:.1} ms: {} / {} frames (ratio {:.3})",
        processing_time_ms,
        summary.cluster_0_count,
        summary.cluster_1_count,
        summary.cluster_ratio
    );

    Ok(SeparationResult {
        w,
        h,
        decibels,
        labels,
        summary,
        metadata: RunMetadata {
            algorithm_version: env!("CARGO_PKG_VERSION").to_string(),
            processing_time_ms,
            seed: config.seed,
            iterations_run,
            stopped_early,
            magnitude_norm,
            reconstruction_error,
            inertia,
        },
    })
}
