//! Audio I/O modules
//!
//! Audio decoding (Symphonia), resampling (rubato) and the `Waveform` type.

pub mod decoder;
pub mod resample;
pub mod waveform;

pub use waveform::{probe_audio_info, AudioInfo, Waveform};
