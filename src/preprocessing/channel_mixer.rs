//! Channel mixing utilities (multi-channel to mono conversion)

use crate::error::{Result, SeparationError};

/// Average interleaved multi-channel audio into mono
///
/// # Arguments
///
/// * `interleaved` - Samples laid out as `[c0, c1, ..., c0, c1, ...]`
/// * `channels` - Number of interleaved channels (>= 1)
///
/// # Returns
///
/// One sample per frame, the arithmetic mean of its channels. A trailing
/// partial frame is dropped.
pub fn downmix_interleaved(interleaved: &[f32], channels: usize) -> Result<Vec<f32>> {
    if channels == 0 {
        return Err(SeparationError::InvalidInput(
            "Channel count must be > 0".to_string(),
        ));
    }

    if channels == 1 {
        return Ok(interleaved.to_vec());
    }

    log::debug!(
        "Down-mixing {} interleaved samples from {} channels",
        interleaved.len(),
        channels
    );

    let scale = 1.0 / channels as f32;
    Ok(interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() * scale)
        .collect())
}
