//! Random initialization of the factor matrices

use crate::error::{Result, SeparationError};
use ndarray::Array2;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Draw `W` (rows × k) and `H` (k × cols) from a half-normal distribution
///
/// Entries are `|N(0, scale²)|`, lifted to at least `floor` so that no entry
/// starts at exactly zero (a zero entry can never grow under multiplicative
/// updates). `W` is filled before `H`, row-major.
pub fn half_normal_factors<R: Rng + ?Sized>(
    rows: usize,
    cols: usize,
    n_components: usize,
    scale: f64,
    floor: f64,
    rng: &mut R,
) -> Result<(Array2<f64>, Array2<f64>)> {
    let normal = Normal::new(0.0, scale).map_err(|e| {
        SeparationError::InvalidInput(format!("invalid init scale {}: {}", scale, e))
    })?;

    let w = Array2::from_shape_fn((rows, n_components), |_| {
        normal.sample(rng).abs().max(floor)
    });
    let h = Array2::from_shape_fn((n_components, cols), |_| {
        normal.sample(rng).abs().max(floor)
    });

    Ok((w, h))
}
