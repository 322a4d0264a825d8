//! Non-negative matrix factorization by multiplicative updates
//!
//! Approximates a magnitude spectrogram `V` (rows × cols) as `W @ H`, with
//! `W` (rows × k) holding per-component spectral profiles and `H` (k × cols)
//! their activations over time.
//!
//! # Algorithm
//!
//! 1. Shift the input by ε: `V = magnitude + ε`
//! 2. Draw `W`, `H` from `|N(0, σ²)|` using the caller's RNG
//! 3. For a fixed number of iterations, update `H` and then `W` (using the
//!    freshly updated `H`) with the KL multiplicative rules in [`update`]
//! 4. Fail with `NumericInstability` if any entry stops being finite
//!
//! Multiplicative updates multiply non-negative entries by non-negative
//! ratios over a strictly positive denominator, so `W` and `H` stay
//! non-negative at every iteration without projection.
//!
//! There is no convergence test unless [`NmfParams::tolerance`] is set; the
//! iteration count is a hard budget.
//!
//! # Example
//!
//! ```
//! use ndarray::Array2;
//! use sound_separator::features::nmf::{factorize_seeded, NmfParams};
//!
//! let magnitude = Array2::from_shape_fn((16, 12), |(r, c)| ((r + c) % 5) as f64);
//! let params = NmfParams { n_components: 2, max_iterations: 100, ..NmfParams::default() };
//! let model = factorize_seeded(&magnitude, &params, 42, None)?;
//! assert_eq!(model.w().dim(), (16, 2));
//! assert_eq!(model.h().dim(), (2, 12));
//! # Ok::<(), sound_separator::SeparationError>(())
//! ```

pub mod divergence;
pub mod init;
pub mod update;

use crate::cancel::CancelToken;
use crate::config::{validate_components, validate_iterations};
use crate::error::{Result, SeparationError};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default denominator floor
///
/// Large enough to keep `V / (W@H + ε)` bounded in `f64` for 10000
/// iterations, small enough not to bias spectrogram-scale values.
pub const DEFAULT_EPSILON: f64 = 1e-10;

/// NMF parameters
#[derive(Debug, Clone, PartialEq)]
pub struct NmfParams {
    /// Number of components `k` (2-20)
    pub n_components: usize,

    /// Iteration budget (100-10000)
    pub max_iterations: usize,

    /// Denominator floor ε (> 0)
    pub epsilon: f64,

    /// Standard deviation of the half-normal initialization (> 0)
    pub init_scale: f64,

    /// Optional early-exit threshold on relative KL improvement
    pub tolerance: Option<f64>,

    /// Iterations between finiteness (and tolerance) checks
    pub check_interval: usize,
}

impl Default for NmfParams {
    fn default() -> Self {
        Self {
            n_components: 8,
            max_iterations: 5000,
            epsilon: DEFAULT_EPSILON,
            init_scale: 2.5,
            tolerance: None,
            check_interval: 100,
        }
    }
}

impl NmfParams {
    /// Validate parameter ranges
    ///
    /// # Errors
    ///
    /// `DegenerateInput` for `n_components` outside 2-20, `InvalidInput` for
    /// everything else.
    pub fn validate(&self) -> Result<()> {
        validate_components(self.n_components)?;
        validate_iterations(self.max_iterations)?;

        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(SeparationError::InvalidInput(format!(
                "epsilon must be positive, got {}",
                self.epsilon
            )));
        }

        if !(self.init_scale.is_finite() && self.init_scale > 0.0) {
            return Err(SeparationError::InvalidInput(format!(
                "init_scale must be positive, got {}",
                self.init_scale
            )));
        }

        if self.check_interval == 0 {
            return Err(SeparationError::InvalidInput(
                "check_interval must be > 0".to_string(),
            ));
        }

        if let Some(tolerance) = self.tolerance {
            if !(tolerance.is_finite() && tolerance >= 0.0) {
                return Err(SeparationError::InvalidInput(format!(
                    "tolerance must be non-negative, got {}",
                    tolerance
                )));
            }
        }

        Ok(())
    }
}

/// Result of a factorization: `W` (rows × k) and `H` (k × cols)
#[derive(Debug, Clone)]
pub struct FactorModel {
    w: Array2<f64>,
    h: Array2<f64>,
    iterations_run: usize,
    stopped_early: bool,
}

impl FactorModel {
    /// Basis matrix (rows × k)
    pub fn w(&self) -> &Array2<f64> {
        &self.w
    }

    /// Activation matrix (k × cols)
    pub fn h(&self) -> &Array2<f64> {
        &self.h
    }

    /// Number of components `k`
    pub fn n_components(&self) -> usize {
        self.w.ncols()
    }

    /// Iterations actually performed
    pub fn iterations_run(&self) -> usize {
        self.iterations_run
    }

    /// Whether the tolerance check ended the run before the budget
    pub fn stopped_early(&self) -> bool {
        self.stopped_early
    }

    /// `W @ H`
    pub fn reconstruct(&self) -> Array2<f64> {
        self.w.dot(&self.h)
    }

    /// Frobenius norm `‖V − W@H‖`
    pub fn reconstruction_error(&self, v: &Array2<f64>) -> f64 {
        divergence::frobenius_error(v, &self.reconstruct())
    }

    /// Generalized KL divergence `D(V ‖ W@H)`
    pub fn kl_divergence(&self, v: &Array2<f64>) -> f64 {
        divergence::kl_divergence(v, &self.reconstruct(), DEFAULT_EPSILON)
    }

    /// Take ownership of `(W, H)`
    pub fn into_parts(self) -> (Array2<f64>, Array2<f64>) {
        (self.w, self.h)
    }
}

/// Factorize `magnitude` with an explicitly seeded RNG
///
/// Same as [`factorize`] with `StdRng::seed_from_u64(seed)`.
pub fn factorize_seeded(
    magnitude: &Array2<f64>,
    params: &NmfParams,
    seed: u64,
    cancel: Option<&CancelToken>,
) -> Result<FactorModel> {
    let mut rng = StdRng::seed_from_u64(seed);
    factorize(magnitude, params, &mut rng, cancel)
}

/// Factorize a non-negative matrix into `W @ H`
///
/// # Arguments
///
/// * `magnitude` - Non-negative input matrix (frequency bins × frames)
/// * `params` - Component count, iteration budget and numeric floors
/// * `rng` - Source of the random initialization
/// * `cancel` - Optional token checked before every iteration
///
/// # Errors
///
/// - `DegenerateInput` if `magnitude` has a zero dimension, or
///   `n_components` is outside 2-20
/// - `InvalidInput` for negative/non-finite input or other bad parameters
/// - `NumericInstability` if `W` or `H` stop being finite
/// - `Cancelled` if the token fires
pub fn factorize<R: Rng + ?Sized>(
    magnitude: &Array2<f64>,
    params: &NmfParams,
    rng: &mut R,
    cancel: Option<&CancelToken>,
) -> Result<FactorModel> {
    let (rows, cols) = magnitude.dim();
    if rows == 0 || cols == 0 {
        return Err(SeparationError::DegenerateInput(format!(
            "Cannot factorize a {}x{} matrix",
            rows, cols
        )));
    }

    params.validate()?;

    if magnitude.iter().any(|&m| !m.is_finite() || m < 0.0) {
        return Err(SeparationError::InvalidInput(
            "Magnitude must be finite and non-negative".to_string(),
        ));
    }

    log::debug!(
        "Factorizing {}x{} matrix: k={}, max_iterations={}, epsilon={:e}",
        rows,
        cols,
        params.n_components,
        params.max_iterations,
        params.epsilon
    );

    let v = magnitude.mapv(|m| m + params.epsilon);
    let (w, h) = init::half_normal_factors(
        rows,
        cols,
        params.n_components,
        params.init_scale,
        params.epsilon,
        rng,
    )?;

    let model = run_updates(&v, w, h, params, params.max_iterations, cancel)?;

    log::debug!(
        "Factorization finished after {} iterations{}",
        model.iterations_run,
        if model.stopped_early { " (early exit)" } else { "" }
    );

    Ok(model)
}

/// Apply up to `iterations` H-then-W updates to an initialized pair
fn run_updates(
    v: &Array2<f64>,
    mut w: Array2<f64>,
    mut h: Array2<f64>,
    params: &NmfParams,
    iterations: usize,
    cancel: Option<&CancelToken>,
) -> Result<FactorModel> {
    let epsilon = params.epsilon;
    let track_divergence = params.tolerance.is_some() || log::log_enabled!(log::Level::Trace);

    let mut previous_divergence: Option<f64> = None;
    let mut iterations_run = 0;
    let mut stopped_early = false;

    for iteration in 1..=iterations {
        if cancel.is_some_and(|token| token.is_cancelled()) {
            log::debug!("Factorization cancelled before iteration {}", iteration);
            return Err(SeparationError::Cancelled);
        }

        update::update_activations(v, &w, &mut h, epsilon);
        update::update_bases(v, &mut w, &h, epsilon);
        iterations_run = iteration;

        if iteration % params.check_interval != 0 {
            continue;
        }

        ensure_finite(&w, &h, iteration)?;

        if track_divergence {
            let current = divergence::kl_divergence(v, &w.dot(&h), epsilon);
            log::trace!("NMF iteration {}: KL divergence {:.6}", iteration, current);

            if let (Some(tolerance), Some(previous)) = (params.tolerance, previous_divergence) {
                let improvement = (previous - current) / previous.max(epsilon);
                if improvement < tolerance {
                    stopped_early = true;
                    break;
                }
            }
            previous_divergence = Some(current);
        }
    }

    ensure_finite(&w, &h, iterations_run)?;

    Ok(FactorModel {
        w,
        h,
        iterations_run,
        stopped_early,
    })
}

fn ensure_finite(w: &Array2<f64>, h: &Array2<f64>, iteration: usize) -> Result<()> {
    if w.iter().chain(h.iter()).all(|x| x.is_finite()) {
        return Ok(());
    }

    Err(SeparationError::NumericInstability(format!(
        "non-finite factor entries after iteration {}",
        iteration
    )))
}
