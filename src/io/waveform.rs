//! Loaded, resampled waveform and lightweight file inspection

use super::decoder::decode_audio;
use super::resample::resample_mono;
use crate::config::validate_sample_rate;
use crate::error::{Result, SeparationError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Mono audio at a known sample rate
///
/// Immutable once built; the sample buffer is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    /// Wrap in-memory mono samples
    ///
    /// # Errors
    ///
    /// `AudioLoad` if `samples` is empty, `InvalidInput` if `sample_rate` is 0.
    pub fn from_samples(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        if samples.is_empty() {
            return Err(SeparationError::AudioLoad(
                "audio contains zero samples".to_string(),
            ));
        }

        if sample_rate == 0 {
            return Err(SeparationError::InvalidInput(
                "Sample rate must be > 0".to_string(),
            ));
        }

        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Decode `path`, down-mix to mono and resample to `target_sample_rate`
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `target_sample_rate` is outside 8000-48000 Hz,
    /// `AudioLoad` if the file cannot be decoded or is empty.
    pub fn load(path: &Path, target_sample_rate: u32) -> Result<Self> {
        validate_sample_rate(target_sample_rate)?;

        let decoded = decode_audio(path)?;
        let samples = resample_mono(&decoded.samples, decoded.sample_rate, target_sample_rate)?;

        Self::from_samples(samples, target_sample_rate)
    }

    /// Resample an existing waveform to another rate
    pub fn resampled(&self, target_sample_rate: u32) -> Result<Self> {
        validate_sample_rate(target_sample_rate)?;
        let samples = resample_mono(&self.samples, self.sample_rate, target_sample_rate)?;
        Self::from_samples(samples, target_sample_rate)
    }

    /// Mono samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True if the waveform has no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds (`len / sample_rate`)
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Basic facts about an audio file at its native rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioInfo {
    /// Native sample rate in Hz
    pub sample_rate: u32,

    /// Duration in seconds
    pub duration: f64,

    /// Number of mono samples
    pub samples: usize,

    /// Source channel count
    pub channels: usize,
}

/// Inspect an audio file without resampling
///
/// # Errors
///
/// `AudioLoad` if the file cannot be decoded or is empty.
pub fn probe_audio_info(path: &Path) -> Result<AudioInfo> {
    let decoded = decode_audio(path)?;
    Ok(AudioInfo {
        sample_rate: decoded.sample_rate,
        duration: decoded.samples.len() as f64 / decoded.sample_rate as f64,
        samples: decoded.samples.len(),
        channels: decoded.channels,
    })
}
