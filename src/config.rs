//! Configuration parameters for the separation pipeline

use crate::error::{Result, SeparationError};
use crate::features::clustering::KMeansParams;
use crate::features::nmf::{NmfParams, DEFAULT_EPSILON};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Allowed number of NMF components
pub const COMPONENT_RANGE: RangeInclusive<usize> = 2..=20;

/// Allowed NMF iteration budget
pub const ITERATION_RANGE: RangeInclusive<usize> = 100..=10_000;

/// Allowed target sample rate in Hz
pub const SAMPLE_RATE_RANGE: RangeInclusive<u32> = 8_000..=48_000;

/// The caller-facing hyperparameter record
///
/// These three values are what an outer layer collects from a user; they are
/// echoed back verbatim in [`crate::ProcessingSummary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hyperparameters {
    /// Number of NMF components (2-20)
    pub n_components: usize,

    /// Number of multiplicative-update iterations (100-10000)
    pub max_iterations: usize,

    /// Target sample rate in Hz (8000-48000)
    pub sample_rate: u32,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            n_components: 8,
            max_iterations: 5000,
            sample_rate: 16_000,
        }
    }
}

impl Hyperparameters {
    /// Check every field against its allowed range
    pub fn validate(&self) -> Result<()> {
        validate_components(self.n_components)?;
        validate_iterations(self.max_iterations)?;
        validate_sample_rate(self.sample_rate)
    }
}

/// Full pipeline configuration
///
/// Wraps [`Hyperparameters`] together with the tuning knobs of each stage.
/// Missing fields fall back to their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeparationConfig {
    // Caller hyperparameters
    /// Number of NMF components (default: 8)
    pub n_components: usize,

    /// NMF iteration budget (default: 5000)
    pub max_iterations: usize,

    /// Target sample rate in Hz (default: 16000)
    pub sample_rate: u32,

    // Reproducibility
    /// Seed for NMF initialization and k-means restarts (default: 0)
    pub seed: u64,

    // NMF
    /// Denominator floor for the multiplicative updates (default: 1e-10)
    pub epsilon: f64,

    /// Standard deviation of the half-normal initialization (default: 2.5)
    pub init_scale: f64,

    /// Relative KL improvement below which NMF stops early (default: None)
    ///
    /// `None` runs the full iteration budget.
    pub tolerance: Option<f64>,

    /// Iterations between divergence/finiteness checks (default: 100)
    pub check_interval: usize,

    // Clustering
    /// Number of k-means restarts (default: 10, minimum 10)
    pub kmeans_restarts: usize,

    /// Lloyd iterations per restart (default: 300)
    pub kmeans_max_iterations: usize,

    /// Relative centroid-shift tolerance for k-means (default: 1e-4)
    pub kmeans_tolerance: f64,

    // Display
    /// Dynamic range of the decibel view in dB (default: Some(80.0))
    pub top_db: Option<f64>,
}

impl Default for SeparationConfig {
    fn default() -> Self {
        let hyper = Hyperparameters::default();
        Self {
            n_components: hyper.n_components,
            max_iterations: hyper.max_iterations,
            sample_rate: hyper.sample_rate,
            seed: 0,
            epsilon: DEFAULT_EPSILON,
            init_scale: 2.5,
            tolerance: None,
            check_interval: 100,
            kmeans_restarts: 10,
            kmeans_max_iterations: 300,
            kmeans_tolerance: 1e-4,
            top_db: Some(80.0),
        }
    }
}

impl SeparationConfig {
    /// Build a configuration from caller hyperparameters, defaults elsewhere
    pub fn from_hyperparameters(hyper: Hyperparameters) -> Self {
        Self {
            n_components: hyper.n_components,
            max_iterations: hyper.max_iterations,
            sample_rate: hyper.sample_rate,
            ..Self::default()
        }
    }

    /// The caller-facing subset of this configuration
    pub fn hyperparameters(&self) -> Hyperparameters {
        Hyperparameters {
            n_components: self.n_components,
            max_iterations: self.max_iterations,
            sample_rate: self.sample_rate,
        }
    }

    /// Parameters for the NMF stage
    pub fn nmf_params(&self) -> NmfParams {
        NmfParams {
            n_components: self.n_components,
            max_iterations: self.max_iterations,
            epsilon: self.epsilon,
            init_scale: self.init_scale,
            tolerance: self.tolerance,
            check_interval: self.check_interval,
        }
    }

    /// Parameters for the clustering stage
    pub fn kmeans_params(&self) -> KMeansParams {
        KMeansParams {
            n_init: self.kmeans_restarts,
            max_iterations: self.kmeans_max_iterations,
            tolerance: self.kmeans_tolerance,
            seed: self.seed,
        }
    }

    /// Validate all parameters
    ///
    /// # Errors
    ///
    /// `DegenerateInput` for a component count outside 2-20, `InvalidInput`
    /// for any other out-of-range value.
    pub fn validate(&self) -> Result<()> {
        self.hyperparameters().validate()?;
        self.nmf_params().validate()?;
        self.kmeans_params().validate()?;

        if let Some(top_db) = self.top_db {
            if !(top_db.is_finite() && top_db > 0.0) {
                return Err(SeparationError::InvalidInput(format!(
                    "top_db must be positive, got {}",
                    top_db
                )));
            }
        }

        Ok(())
    }
}

pub(crate) fn validate_components(n_components: usize) -> Result<()> {
    if !COMPONENT_RANGE.contains(&n_components) {
        return Err(SeparationError::DegenerateInput(format!(
            "n_components must be in [{}, {}], got {}",
            COMPONENT_RANGE.start(),
            COMPONENT_RANGE.end(),
            n_components
        )));
    }
    Ok(())
}

pub(crate) fn validate_iterations(max_iterations: usize) -> Result<()> {
    if !ITERATION_RANGE.contains(&max_iterations) {
        return Err(SeparationError::InvalidInput(format!(
            "max_iterations must be in [{}, {}], got {}",
            ITERATION_RANGE.start(),
            ITERATION_RANGE.end(),
            max_iterations
        )));
    }
    Ok(())
}

pub(crate) fn validate_sample_rate(sample_rate: u32) -> Result<()> {
    if !SAMPLE_RATE_RANGE.contains(&sample_rate) {
        return Err(SeparationError::InvalidInput(format!(
            "sample_rate must be in [{}, {}] Hz, got {}",
            SAMPLE_RATE_RANGE.start(),
            SAMPLE_RATE_RANGE.end(),
            sample_rate
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SeparationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.n_components, 8);
        assert_eq!(config.max_iterations, 5000);
        assert_eq!(config.sample_rate, 16_000);
        assert!(config.tolerance.is_none());
    }

    #[test]
    fn test_component_range_is_degenerate_input() {
        for k in [0, 1, 21] {
            let config = SeparationConfig {
                n_components: k,
                ..SeparationConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(SeparationError::DegenerateInput(_))
            ));
        }
    }

    #[test]
    fn test_iteration_and_rate_ranges() {
        let config = SeparationConfig {
            max_iterations: 99,
            ..SeparationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SeparationError::InvalidInput(_))
        ));

        let config = SeparationConfig {
            sample_rate: 48_001,
            ..SeparationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SeparationError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_too_few_restarts_rejected() {
        let config = SeparationConfig {
            kmeans_restarts: 3,
            ..SeparationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_roundtrip_hyperparameters() {
        let hyper = Hyperparameters {
            n_components: 4,
            max_iterations: 200,
            sample_rate: 22_050,
        };
        let config = SeparationConfig::from_hyperparameters(hyper);
        assert_eq!(config.hyperparameters(), hyper);
        assert_eq!(config.seed, 0);
    }
}
