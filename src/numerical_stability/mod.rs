//! numerical_stability — numerically robust transforms and log-domain reductions.
//!
//! Purpose
//! -------
//! Collect the numerically stable scalar transforms and log-domain
//! reductions used throughout the disclosure-risk stack, so density and
//! estimator code can assume well-conditioned `f64` arithmetic.
//!
//! Key behaviors
//! -------------
//! - Provide stable scalar transforms (`safe_softplus`, `safe_logistic`)
//!   for Bernoulli log-masses and logistic links.
//! - Provide log-domain reductions (`log_sum_exp`, `normalize_log_weights`)
//!   for aggregating posterior draws and normalizing the guess grid.
//! - Provide `log_ratio`, which defines how impossible numerators and
//!   denominators combine.
//!
//! Invariants & assumptions
//! ------------------------
//! - `NaN` is never propagated out of the reductions; it is treated as
//!   zero mass (`-∞` in the log domain).
//! - Inputs are plain `f64` values or `ndarray` views; shape validation is
//!   performed by callers.
//!
//! Conventions
//! -----------
//! - This module never logs, performs I/O, or touches global state; it is
//!   pure numerical helpers suitable for tight inner loops.
//!
//! Downstream usage
//! ----------------
//! - `risk::core::family` uses the scalar transforms for Bernoulli masses.
//! - `risk::models::sampler` aggregates per-draw weights via `log_sum_exp`.
//! - `risk::models::record` normalizes the guess grid via
//!   `normalize_log_weights`.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`transformations`] cover agreement with naive formulas,
//!   tail behavior, shift stability, and the degenerate-input conventions.

pub mod transformations;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::transformations::{
    GENERAL_TOL, log_ratio, log_sum_exp, normalize_log_weights, safe_logistic, safe_softplus,
};
