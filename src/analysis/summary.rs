//! Summary statistics for one separation run

use crate::config::Hyperparameters;
use crate::error::{Result, SeparationError};
use crate::features::clustering::ClusterAssignment;
use crate::features::nmf::FactorModel;
use crate::features::spectrogram::Spectrogram;
use serde::{Deserialize, Serialize};

/// Shapes, cluster counts and hyperparameters of a run
///
/// Field names (including the capitalized `W_shape`, `H_shape`, `D_shape`)
/// are the serialized contract consumed by reporting layers. Shapes
/// serialize as `[rows, cols]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingSummary {
    /// Sample rate the audio was analysed at (Hz)
    pub sample_rate: u32,

    /// Audio duration in seconds
    pub duration: f64,

    /// Number of NMF components
    pub n_components: usize,

    /// NMF iteration budget
    pub max_iterations: usize,

    /// Shape of the basis matrix `W`
    #[serde(rename = "W_shape")]
    pub w_shape: (usize, usize),

    /// Shape of the activation matrix `H`
    #[serde(rename = "H_shape")]
    pub h_shape: (usize, usize),

    /// Shape of the decibel spectrogram
    #[serde(rename = "D_shape")]
    pub d_shape: (usize, usize),

    /// Frames labelled 0
    pub cluster_0_count: usize,

    /// Frames labelled 1
    pub cluster_1_count: usize,

    /// `cluster_0_count / (cluster_0_count + cluster_1_count)`
    pub cluster_ratio: f64,
}

/// Build the summary of a run
///
/// # Errors
///
/// `InvariantViolation` if the stage outputs disagree in shape (labels vs `H`
/// columns, `W`/`H` vs spectrogram, component count vs hyperparameters).
pub fn summarize(
    spectrogram: &Spectrogram,
    model: &FactorModel,
    assignment: &ClusterAssignment,
    hyperparameters: &Hyperparameters,
) -> Result<ProcessingSummary> {
    let d_shape = spectrogram.shape();
    let w_shape = model.w().dim();
    let h_shape = model.h().dim();

    if w_shape.0 != d_shape.0 || h_shape.1 != d_shape.1 || w_shape.1 != h_shape.0 {
        return Err(SeparationError::InvariantViolation(format!(
            "factor shapes W={:?}, H={:?} do not match spectrogram {:?}",
            w_shape, h_shape, d_shape
        )));
    }

    if assignment.len() != h_shape.1 {
        return Err(SeparationError::InvariantViolation(format!(
            "{} labels for {} activation columns",
            assignment.len(),
            h_shape.1
        )));
    }

    if w_shape.1 != hyperparameters.n_components {
        return Err(SeparationError::InvariantViolation(format!(
            "model has {} components, hyperparameters say {}",
            w_shape.1, hyperparameters.n_components
        )));
    }

    if spectrogram.sample_rate() != hyperparameters.sample_rate {
        return Err(SeparationError::InvariantViolation(format!(
            "spectrogram at {} Hz, hyperparameters say {} Hz",
            spectrogram.sample_rate(),
            hyperparameters.sample_rate
        )));
    }

    let [cluster_0_count, cluster_1_count] = assignment.counts();
    let total = cluster_0_count + cluster_1_count;
    if total == 0 {
        return Err(SeparationError::DegenerateInput(
            "no labelled frames to summarize".to_string(),
        ));
    }

    Ok(ProcessingSummary {
        sample_rate: spectrogram.sample_rate(),
        duration: spectrogram.duration(),
        n_components: hyperparameters.n_components,
        max_iterations: hyperparameters.max_iterations,
        w_shape,
        h_shape,
        d_shape,
        cluster_0_count,
        cluster_1_count,
        cluster_ratio: cluster_0_count as f64 / total as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::clustering::{cluster, KMeansParams};
    use crate::features::nmf::{factorize_seeded, NmfParams};
    use crate::io::Waveform;

    fn fixture() -> (Spectrogram, FactorModel, ClusterAssignment, Hyperparameters) {
        let samples: Vec<f32> = (0..8000)
            .map(|i| {
                let t = i as f32 / 8000.0;
                let f = if i < 4000 { 300.0 } else { 1500.0 };
                (2.0 * std::f32::consts::PI * f * t).sin()
            })
            .collect();
        let waveform = Waveform::from_samples(samples, 8000).unwrap();
        let spectrogram = Spectrogram::from_waveform(&waveform).unwrap();

        let hyper = Hyperparameters {
            n_components: 2,
            max_iterations: 100,
            sample_rate: 8000,
        };
        let params = NmfParams {
            n_components: 2,
            max_iterations: 100,
            ..NmfParams::default()
        };
        let model = factorize_seeded(spectrogram.magnitude(), &params, 0, None).unwrap();
        let assignment = cluster(model.h(), &KMeansParams::default()).unwrap();
        (spectrogram, model, assignment, hyper)
    }

    #[test]
    fn test_counts_and_exact_ratio() {
        let (spectrogram, model, assignment, hyper) = fixture();
        let summary = summarize(&spectrogram, &model, &assignment, &hyper).unwrap();

        assert_eq!(summary.d_shape, (513, 17));
        assert_eq!(summary.w_shape, (513, 2));
        assert_eq!(summary.h_shape, (2, 17));
        assert_eq!(summary.cluster_0_count + summary.cluster_1_count, 17);
        assert_eq!(
            summary.cluster_ratio,
            summary.cluster_0_count as f64
                / (summary.cluster_0_count + summary.cluster_1_count) as f64
        );
        assert_eq!(summary.sample_rate, 8000);
        assert!((summary.duration - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_mismatched_hyperparameters_are_invariant_violations() {
        let (spectrogram, model, assignment, hyper) = fixture();
        let wrong_k = Hyperparameters {
            n_components: 3,
            ..hyper
        };
        assert!(matches!(
            summarize(&spectrogram, &model, &assignment, &wrong_k),
            Err(SeparationError::InvariantViolation(_))
        ));

        let wrong_rate = Hyperparameters {
            sample_rate: 16_000,
            ..hyper
        };
        assert!(matches!(
            summarize(&spectrogram, &model, &assignment, &wrong_rate),
            Err(SeparationError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_label_length_mismatch() {
        let (spectrogram, model, _, hyper) = fixture();
        let short = cluster(
            &model.h().slice(ndarray::s![.., ..10]).to_owned(),
            &KMeansParams::default(),
        )
        .unwrap();
        assert!(matches!(
            summarize(&spectrogram, &model, &short, &hyper),
            Err(SeparationError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_serialized_field_names() {
        let (spectrogram, model, assignment, hyper) = fixture();
        let summary = summarize(&spectrogram, &model, &assignment, &hyper).unwrap();
        let json = serde_json::to_value(&summary).unwrap();

        for key in [
            "sample_rate",
            "duration",
            "n_components",
            "max_iterations",
            "W_shape",
            "H_shape",
            "D_shape",
            "cluster_0_count",
            "cluster_1_count",
            "cluster_ratio",
        ] {
            assert!(json.get(key).is_some(), "missing field {}", key);
        }
        assert_eq!(json["W_shape"], serde_json::json!([513, 2]));
        assert_eq!(json.as_object().unwrap().len(), 10);
    }
}
