//! Reconstruction quality measures

use ndarray::Array2;

/// Frobenius norm `‖V − A‖`
pub fn frobenius_error(v: &Array2<f64>, approx: &Array2<f64>) -> f64 {
    v.iter()
        .zip(approx.iter())
        .map(|(&a, &b)| (a - b) * (a - b))
        .sum::<f64>()
        .sqrt()
}

/// Generalized Kullback-Leibler divergence `D(V ‖ A)`
///
/// `Σ V·ln(V / A) − V + A`, with `epsilon` guarding both logarithm
/// arguments. Zero entries of `V` contribute only `A`.
pub fn kl_divergence(v: &Array2<f64>, approx: &Array2<f64>, epsilon: f64) -> f64 {
    v.iter()
        .zip(approx.iter())
        .map(|(&target, &a)| {
            let a = a + epsilon;
            if target > 0.0 {
                target * ((target + epsilon) / a).ln() - target + a
            } else {
                a
            }
        })
        .sum()
}
