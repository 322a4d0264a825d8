//! Feature extraction and decomposition modules
//!
//! The three numeric stages of the pipeline, in data-flow order:
//! - Spectrogram extraction (STFT magnitude + decibel view)
//! - Non-negative matrix factorization
//! - Two-way clustering of activations

pub mod clustering;
pub mod nmf;
pub mod spectrogram;
