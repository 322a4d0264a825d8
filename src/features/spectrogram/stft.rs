//! Short-time Fourier transform magnitude
//!
//! # Framing
//!
//! Frames are centred on `t = i * hop` for `i = 0 ..= ceil(n / hop)`. The
//! signal is zero-padded by `n_fft / 2` samples on the left and as far as the
//! last frame needs on the right, giving
//!
//! ```text
//! n_frames = ceil(n / hop) + 1
//! ```
//!
//! Each frame is multiplied by a periodic Hann window before the FFT. Only the
//! non-negative frequencies (`n_fft / 2 + 1` bins) are kept.

use crate::error::{Result, SeparationError};
use ndarray::Array2;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Number of frames produced for `n_samples` with the given hop
pub fn frame_count(n_samples: usize, hop_length: usize) -> usize {
    n_samples.div_ceil(hop_length) + 1
}

/// Periodic Hann window of length `n`
pub fn hann_window(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
            0.5 * (1.0 - t.cos())
        })
        .collect()
}

/// Compute the STFT magnitude of `samples`
///
/// # Arguments
///
/// * `samples` - Mono audio samples
/// * `n_fft` - Frame size (even, > 0)
/// * `hop_length` - Hop size (> 0)
///
/// # Returns
///
/// Magnitude matrix of shape `(n_fft / 2 + 1, ceil(n / hop) + 1)`; rows are
/// frequency bins, columns are frames.
///
/// # Errors
///
/// `DegenerateInput` for empty input, `InvalidInput` for bad frame/hop sizes.
pub fn stft_magnitude(samples: &[f32], n_fft: usize, hop_length: usize) -> Result<Array2<f64>> {
    if samples.is_empty() {
        return Err(SeparationError::DegenerateInput(
            "Cannot compute STFT of zero samples".to_string(),
        ));
    }

    if n_fft == 0 || n_fft % 2 != 0 {
        return Err(SeparationError::InvalidInput(format!(
            "Frame size must be even and > 0, got {}",
            n_fft
        )));
    }

    if hop_length == 0 {
        return Err(SeparationError::InvalidInput(
            "Hop size must be > 0".to_string(),
        ));
    }

    let n_bins = n_fft / 2 + 1;
    let n_frames = frame_count(samples.len(), hop_length);
    let pad = n_fft / 2;

    log::debug!(
        "Computing STFT: {} samples, n_fft={}, hop={}, {} frames",
        samples.len(),
        n_fft,
        hop_length,
        n_frames
    );

    let padded_len = (n_frames - 1) * hop_length + n_fft;
    let mut padded = vec![0.0f64; padded_len];
    for (dst, &src) in padded[pad..].iter_mut().zip(samples) {
        *dst = src as f64;
    }

    let window = hann_window(n_fft);
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n_fft);
    let mut scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
    let mut buffer = vec![Complex::new(0.0, 0.0); n_fft];

    let mut magnitude = Array2::<f64>::zeros((n_bins, n_frames));

    for frame_idx in 0..n_frames {
        let start = frame_idx * hop_length;
        let frame = &padded[start..start + n_fft];
        for ((slot, &x), &w) in buffer.iter_mut().zip(frame).zip(&window) {
            *slot = Complex::new(x * w, 0.0);
        }

        fft.process_with_scratch(&mut buffer, &mut scratch);

        for (bin, value) in buffer.iter().take(n_bins).enumerate() {
            magnitude[[bin, frame_idx]] = value.norm();
        }
    }

    Ok(magnitude)
}
