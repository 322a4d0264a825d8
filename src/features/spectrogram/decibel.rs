//! Decibel view of a magnitude spectrogram (display only)

use ndarray::Array2;

/// Floor applied to magnitudes before taking the logarithm
pub const AMPLITUDE_FLOOR: f64 = 1e-10;

/// Convert magnitudes to decibels relative to the loudest bin
///
/// Computes `20 * log10(max(m, floor) / max(max_m, floor))`, so the loudest
/// bin maps to 0 dB and exact zeros map to a finite value instead of `-inf`.
///
/// # Arguments
///
/// * `magnitude` - Non-negative magnitude matrix
/// * `top_db` - Optional dynamic range; values below `-top_db` are clamped to it
pub fn amplitude_to_db(magnitude: &Array2<f64>, top_db: Option<f64>) -> Array2<f64> {
    let reference = magnitude
        .iter()
        .fold(0.0f64, |acc, &m| acc.max(m))
        .max(AMPLITUDE_FLOOR);
    let ref_db = 20.0 * reference.log10();

    let mut db = magnitude.mapv(|m| 20.0 * m.max(AMPLITUDE_FLOOR).log10() - ref_db);

    if let Some(range) = top_db {
        let lowest = -range;
        db.mapv_inplace(|v| v.max(lowest));
    }

    db
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_reference_is_zero_db() {
        let mag = array![[1.0, 10.0], [0.1, 5.0]];
        let db = amplitude_to_db(&mag, None);
        assert!(db[[0, 1]].abs() < 1e-12);
        assert!((db[[0, 0]] + 20.0).abs() < 1e-9);
        assert!((db[[1, 0]] + 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_magnitude_is_finite() {
        let mag = array![[0.0, 1.0]];
        let db = amplitude_to_db(&mag, None);
        assert!(db[[0, 0]].is_finite());
        assert!((db[[0, 0]] + 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_top_db_clamps() {
        let mag = array![[0.0, 1.0, 1e-3]];
        let db = amplitude_to_db(&mag, Some(80.0));
        assert!((db[[0, 0]] + 80.0).abs() < 1e-9);
        assert!((db[[0, 2]] + 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_all_silent() {
        let mag = Array2::<f64>::zeros((3, 4));
        let db = amplitude_to_db(&mag, Some(80.0));
        assert!(db.iter().all(|&v| v == 0.0));
    }
}
