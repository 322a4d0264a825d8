//! Magnitude spectrogram extraction
//!
//! Loads a waveform, resamples it and computes the STFT magnitude with a
//! fixed analysis setup that every downstream stage relies on:
//!
//! - Frame size: 1024 samples ([`N_FFT`])
//! - Hop size: 512 samples ([`HOP_LENGTH`])
//! - Window: periodic Hann
//! - Framing: centred, zero-padded, `ceil(n / hop) + 1` frames
//!
//! Phase is discarded; nothing downstream uses it.
//!
//! # Example
//!
//! ```no_run
//! use sound_separator::features::spectrogram::extract;
//! use std::path::Path;
//!
//! let spectrogram = extract(Path::new("recording.wav"), 16_000)?;
//! let (rows, cols) = spectrogram.shape();
//! assert_eq!(rows, 513);
//! # Ok::<(), sound_separator::SeparationError>(())
//! ```

pub mod decibel;
pub mod stft;

use crate::error::Result;
use crate::io::Waveform;
use ndarray::Array2;
use std::path::Path;

/// STFT frame size in samples
pub const N_FFT: usize = 1024;

/// STFT hop size in samples
pub const HOP_LENGTH: usize = 512;

/// Magnitude spectrogram of one waveform
///
/// Rows are the `N_FFT / 2 + 1` frequency bins, columns are frames.
#[derive(Debug, Clone)]
pub struct Spectrogram {
    magnitude: Array2<f64>,
    sample_rate: u32,
    duration: f64,
}

impl Spectrogram {
    /// Compute the spectrogram of an in-memory waveform
    pub fn from_waveform(waveform: &Waveform) -> Result<Self> {
        let magnitude = stft::stft_magnitude(waveform.samples(), N_FFT, HOP_LENGTH)?;

        log::debug!(
            "Spectrogram: {}x{} at {} Hz ({:.2}s)",
            magnitude.nrows(),
            magnitude.ncols(),
            waveform.sample_rate(),
            waveform.duration()
        );

        Ok(Self {
            magnitude,
            sample_rate: waveform.sample_rate(),
            duration: waveform.duration(),
        })
    }

    /// Non-negative magnitude matrix
    pub fn magnitude(&self) -> &Array2<f64> {
        &self.magnitude
    }

    /// `(rows, cols)` = `(frequency bins, frames)`
    pub fn shape(&self) -> (usize, usize) {
        self.magnitude.dim()
    }

    /// Sample rate of the analysed waveform in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration of the analysed waveform in seconds
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Centre frequency of `bin` in Hz
    pub fn bin_frequency(&self, bin: usize) -> f64 {
        bin as f64 * self.sample_rate as f64 / N_FFT as f64
    }

    /// Decibel view relative to the loudest bin
    ///
    /// See [`decibel::amplitude_to_db`]; `top_db` limits the dynamic range.
    pub fn to_decibels(&self, top_db: Option<f64>) -> Array2<f64> {
        decibel::amplitude_to_db(&self.magnitude, top_db)
    }
}

/// Load `path`, resample to `target_sample_rate` and compute its spectrogram
///
/// # Errors
///
/// - `InvalidInput` if `target_sample_rate` is outside 8000-48000 Hz
/// - `AudioLoad` if the file cannot be decoded or contains no samples
pub fn extract(path: &Path, target_sample_rate: u32) -> Result<Spectrogram> {
    let waveform = Waveform::load(path, target_sample_rate)?;
    Spectrogram::from_waveform(&waveform)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: u32, n: usize) -> Vec<f32> {
        (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn test_sine_shape_and_peak() {
        let waveform = Waveform::from_samples(sine(440.0, 16_000, 16_000), 16_000).unwrap();
        let spec = Spectrogram::from_waveform(&waveform).unwrap();

        assert_eq!(spec.shape(), (513, 16_000usize.div_ceil(512) + 1));

        let energy: Vec<f64> = spec.magnitude().rows().into_iter().map(|r| r.sum()).collect();
        let peak_bin = energy
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();

        let expected = (440.0 / spec.bin_frequency(1)).round() as usize;
        assert_eq!(peak_bin, expected);
        assert_eq!(expected, 28);
    }

    #[test]
    fn test_metadata_carried() {
        let waveform = Waveform::from_samples(vec![0.0; 8000], 8000).unwrap();
        let spec = Spectrogram::from_waveform(&waveform).unwrap();
        assert_eq!(spec.sample_rate(), 8000);
        assert!((spec.duration() - 1.0).abs() < 1e-12);
        assert!((spec.bin_frequency(512) - 4000.0).abs() < 1e-9);
    }

    #[test]
    fn test_decibels_same_shape() {
        let waveform = Waveform::from_samples(sine(1000.0, 16_000, 4000), 16_000).unwrap();
        let spec = Spectrogram::from_waveform(&waveform).unwrap();
        let db = spec.to_decibels(Some(80.0));
        assert_eq!(db.dim(), spec.shape());
        assert!(db.iter().all(|&v| v <= 1e-9 && v >= -80.0 - 1e-9));
    }
}
