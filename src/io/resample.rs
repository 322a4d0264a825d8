//! Sample rate conversion using rubato
//!
//! Mono signals are converted in a single fixed-input pass, then the
//! resampler is flushed and its output delay trimmed so that the result has
//! exactly `ceil(n * target / source)` samples aligned with the input.

use crate::error::{Result, SeparationError};
use rubato::{FastFixedIn, PolynomialDegree, Resampler};

/// Resample mono audio from `source_rate` to `target_rate`
///
/// # Arguments
///
/// * `samples` - Mono samples
/// * `source_rate` - Sample rate of `samples` in Hz
/// * `target_rate` - Desired sample rate in Hz
///
/// # Returns
///
/// Resampled mono samples. A copy of the input is returned when the rates
/// already match.
///
/// # Errors
///
/// `InvalidInput` for a zero rate, `AudioLoad` if rubato rejects the
/// conversion.
pub fn resample_mono(samples: &[f32], source_rate: u32, target_rate: u32) -> Result<Vec<f32>> {
    if source_rate == 0 || target_rate == 0 {
        return Err(SeparationError::InvalidInput(format!(
            "Sample rates must be > 0 (source={}, target={})",
            source_rate, target_rate
        )));
    }

    if samples.is_empty() || source_rate == target_rate {
        log::debug!("Sample rate already at {} Hz, skipping resample", target_rate);
        return Ok(samples.to_vec());
    }

    let ratio = target_rate as f64 / source_rate as f64;
    let expected_len = ((samples.len() as u64 * target_rate as u64 + source_rate as u64 - 1)
        / source_rate as u64) as usize;

    log::debug!(
        "Resampling {} samples from {} Hz to {} Hz",
        samples.len(),
        source_rate,
        target_rate
    );

    let mut resampler =
        FastFixedIn::<f32>::new(ratio, 1.0, PolynomialDegree::Septic, samples.len(), 1)
            .map_err(|e| {
                SeparationError::AudioLoad(format!("failed to create resampler: {}", e))
            })?;
    let delay = resampler.output_delay();

    let mut output = resampler
        .process(&[samples], None)
        .map_err(|e| SeparationError::AudioLoad(format!("resampling failed: {}", e)))?
        .remove(0);

    // Flush the interpolator tail so the trimmed output covers the full input
    let tail = resampler
        .process_partial::<Vec<f32>>(None, None)
        .map_err(|e| SeparationError::AudioLoad(format!("resampler flush failed: {}", e)))?;
    if let Some(channel) = tail.into_iter().next() {
        output.extend(channel);
    }

    let mut resampled: Vec<f32> = output.into_iter().skip(delay).take(expected_len).collect();
    resampled.resize(expected_len, 0.0);

    log::debug!("Resampled to {} samples", resampled.len());

    Ok(resampled)
}
