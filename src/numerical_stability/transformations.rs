//! Numerical stability utilities.
//!
//! Provides safe implementations of the nonlinear transforms and
//! reductions used by the disclosure-risk estimators. The scalar helpers
//! keep `f64` arithmetic in a well-conditioned regime through explicit
//! cutoffs (`x > 20.0`), and the reductions operate in the log domain so
//! that densities far below `f64::MIN_POSITIVE` still contribute.
//!
//! # Provided items
//! - [`GENERAL_TOL`]: generic tolerance for probability-mass checks.
//! - [`safe_softplus(x)`]: stable `ln(1 + exp(x))`.
//! - [`safe_logistic(x)`]: stable `1 / (1 + exp(-x))`.
//! - [`log_sum_exp(values)`]: stable `ln Σ exp(vᵢ)`.
//! - [`normalize_log_weights(values)`]: log-domain softmax.
//! - [`log_ratio(num, den)`]: difference of log densities with NaN mapped
//!   to `-∞`.
//!
//! # Conventions
//! - `NaN` inputs to the reductions are treated as `-∞` (zero mass); they
//!   can only arise from `∞ - ∞` in degenerate posterior draws and must not
//!   poison the rest of the grid.
use ndarray::{Array1, ArrayView1};

/// Generic tolerance for probability-mass comparisons (sums to one,
/// probability entries in `[0, 1]`).
pub const GENERAL_TOL: f64 = 1e-9;

/// Numerically stable softplus: `softplus(x) = ln(1 + exp(x))`.
///
/// - For sufficiently large `x`, `softplus(x) ≈ x`.
/// - Otherwise, it falls back to `ln1p(exp(x))`, which underflows
///   gracefully to `0.0` for very negative `x`.
///
/// The cutoff (`x > 20.0`) keeps the calculation well-conditioned for
/// `f64`.
pub fn safe_softplus(x: f64) -> f64 {
    if x > 20.0 { x } else { x.exp().ln_1p() }
}

/// Numerically stable logistic function `σ(x) = 1 / (1 + exp(-x))`.
///
/// Evaluates `exp` only on non-positive arguments so that neither branch
/// overflows. `σ(±∞)` is `1.0` / `0.0`.
pub fn safe_logistic(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Stable `ln Σᵢ exp(vᵢ)`.
///
/// Parameters
/// ----------
/// - `values`: `ArrayView1<f64>`
///   Log-domain terms. `NaN` entries are skipped (treated as `-∞`).
///
/// Returns
/// -------
/// `f64`
///   - `-∞` when `values` is empty or every term is `-∞`/`NaN`,
///   - `+∞` when any term is `+∞`,
///   - otherwise `m + ln Σ exp(vᵢ - m)` with `m = max vᵢ`.
///
/// Notes
/// -----
/// - Subtracting the maximum guarantees the largest term is `exp(0) = 1`,
///   so the sum never overflows and is never smaller than one.
pub fn log_sum_exp(values: ArrayView1<'_, f64>) -> f64 {
    let max = values.iter().copied().filter(|v| !v.is_nan()).fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY || max == f64::INFINITY {
        return max;
    }
    let sum: f64 = values.iter().filter(|v| !v.is_nan()).map(|&v| (v - max).exp()).sum();
    max + sum.ln()
}

/// Log-domain softmax: `pᵢ = exp(xᵢ - max x) / Σⱼ exp(xⱼ - max x)`.
///
/// Parameters
/// ----------
/// - `log_weights`: `ArrayView1<f64>`
///   Unnormalized log weights. `-∞` and `NaN` entries receive probability
///   zero.
///
/// Returns
/// -------
/// `Option<Array1<f64>>`
///   - `Some(p)` with `p` summing to one when at least one entry is finite.
///   - `None` when no entry is finite (nothing to normalize) or an entry is
///     `+∞`.
pub fn normalize_log_weights(log_weights: ArrayView1<'_, f64>) -> Option<Array1<f64>> {
    let max =
        log_weights.iter().copied().filter(|v| !v.is_nan()).fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return None;
    }
    let mut probs = log_weights.mapv(|v| if v.is_nan() { 0.0 } else { (v - max).exp() });
    let total = probs.sum();
    probs.mapv_inplace(|p| p / total);
    Some(probs)
}

/// Difference of two log densities, `ln(a / b) = ln a - ln b`.
///
/// - An impossible numerator (`num = -∞`) always yields `-∞`, including the
///   `0 / 0` case.
/// - Any remaining `NaN` (e.g. `∞ - ∞`) is mapped to `-∞`.
pub fn log_ratio(num: f64, den: f64) -> f64 {
    if num == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    let diff = num - den;
    if diff.is_nan() { f64::NEG_INFINITY } else { diff }
}
