//! Multiplicative update rules (Lee & Seung, KL divergence)
//!
//! ```text
//! H ← H ⊙ (Wᵗ @ (V / (W@H + ε))) / (Wᵗ @ 𝟙 + ε)
//! W ← W ⊙ ((V / (W@H + ε)) @ Hᵗ) / (𝟙 @ Hᵗ + ε)
//! ```
//!
//! `Wᵗ @ 𝟙` has every column equal to the column sums of `W`, and `𝟙 @ Hᵗ`
//! has every row equal to the row sums of `H`; both are computed as vectors
//! and broadcast instead of materializing the all-ones matrix.

use ndarray::{Array2, Axis};

/// `V / (W @ H + ε)`, element-wise
pub fn evidence_ratio(v: &Array2<f64>, w: &Array2<f64>, h: &Array2<f64>, epsilon: f64) -> Array2<f64> {
    let mut ratio = w.dot(h);
    ratio.zip_mut_with(v, |approx, &target| *approx = target / (*approx + epsilon));
    ratio
}

/// Update the activation matrix `H` in place
pub fn update_activations(v: &Array2<f64>, w: &Array2<f64>, h: &mut Array2<f64>, epsilon: f64) {
    let ratio = evidence_ratio(v, w, h, epsilon);
    let numerator = w.t().dot(&ratio);
    let denominator = w
        .sum_axis(Axis(0))
        .mapv(|s| s + epsilon)
        .insert_axis(Axis(1));

    *h *= &numerator;
    *h /= &denominator;
}

/// Update the basis matrix `W` in place
pub fn update_bases(v: &Array2<f64>, w: &mut Array2<f64>, h: &Array2<f64>, epsilon: f64) {
    let ratio = evidence_ratio(v, w, h, epsilon);
    let numerator = ratio.dot(&h.t());
    let denominator = h
        .sum_axis(Axis(1))
        .mapv(|s| s + epsilon)
        .insert_axis(Axis(0));

    *w *= &numerator;
    *w /= &denominator;
}
