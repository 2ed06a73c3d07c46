//! Posterior draws — validated parameter samples for one synthesis model.
//!
//! Purpose
//! -------
//! Hold the H′ posterior parameter draws of one synthesis model in the
//! layout its [`Family`] needs, validated once so the estimators can index
//! them without re-checking.
//!
//! Key behaviors
//! -------------
//! - Split a raw `H′ × (P [+ 1])` matrix into coefficients and an optional
//!   scale column ([`PosteriorDraws::from_matrix`]).
//! - Validate scales (finite, > 0), coefficients (finite), and multinomial
//!   probabilities (finite, in `[0, 1]`).
//!
//! Invariants & assumptions
//! ------------------------
//! - At least one draw and one coefficient (or category) column.
//! - `scale.is_some()` iff `family.has_scale()`, with one entry per draw.
//! - For [`Family::Multinomial`], row `h` of `coefficients` is the category
//!   probability vector of draw `h`, indexed by level code.
//! - Convergence of the draws is the caller's concern.
//!
//! Conventions
//! -----------
//! - Draws are rows; draw `h` is row `h` (0-based). Estimators that use
//!   only `H ≤ H′` draws take the first `H` rows.
use crate::risk::{
    core::family::Family,
    errors::{RiskError, RiskResult},
};
use ndarray::{Array1, Array2, ArrayView1, s};

/// Posterior parameter draws for one synthesis model.
#[derive(Debug, Clone, PartialEq)]
pub struct PosteriorDraws {
    family: Family,
    /// `H′ × P` coefficients, or `H′ × C` category probabilities.
    coefficients: Array2<f64>,
    /// Per-draw standard deviation for families with a scale.
    scale: Option<Array1<f64>>,
}

impl PosteriorDraws {
    /// Build draws from a raw matrix whose last column is the scale when
    /// `family.has_scale()`.
    ///
    /// # Errors
    /// - [`RiskError::InvalidConfiguration`] if the matrix has no rows, or
    ///   too few columns for the family.
    /// - See [`PosteriorDraws::new`] for value checks.
    pub fn from_matrix(matrix: Array2<f64>, family: Family) -> RiskResult<PosteriorDraws> {
        if family.has_scale() {
            let ncols = matrix.ncols();
            if ncols < 2 {
                return Err(RiskError::config(format!(
                    "{family} draws need at least one coefficient column plus a scale column; got {ncols} columns"
                )));
            }
            let scale = matrix.column(ncols - 1).to_owned();
            let coefficients = matrix.slice(s![.., ..ncols - 1]).to_owned();
            PosteriorDraws::new(coefficients, Some(scale), family)
        } else {
            PosteriorDraws::new(matrix, None, family)
        }
    }

    /// Build draws from separate coefficient and scale parts.
    ///
    /// # Errors
    /// - [`RiskError::InvalidConfiguration`] for empty matrices, a missing or
    ///   unexpected scale, a scale of the wrong length, or non-finite
    ///   coefficients.
    /// - [`RiskError::InvalidScale`] for a scale that is not finite and > 0.
    /// - [`RiskError::InvalidProbability`] for multinomial entries outside
    ///   `[0, 1]`.
    pub fn new(
        coefficients: Array2<f64>, scale: Option<Array1<f64>>, family: Family,
    ) -> RiskResult<PosteriorDraws> {
        let (n_draws, n_cols) = coefficients.dim();
        if n_draws == 0 || n_cols == 0 {
            return Err(RiskError::config(format!(
                "{family} draws must have at least one row and one column; got {n_draws} x {n_cols}"
            )));
        }

        match (&scale, family.has_scale()) {
            (None, true) => {
                return Err(RiskError::config(format!("{family} draws require a scale column")));
            }
            (Some(_), false) => {
                return Err(RiskError::config(format!("{family} draws do not take a scale column")));
            }
            (Some(sd), true) => {
                if sd.len() != n_draws {
                    return Err(RiskError::config(format!(
                        "scale column has {} entries for {n_draws} draws",
                        sd.len()
                    )));
                }
                if let Some((draw, &value)) =
                    sd.iter().enumerate().find(|(_, v)| !(v.is_finite() && **v > 0.0))
                {
                    return Err(RiskError::InvalidScale { draw, value });
                }
            }
            (None, false) => {}
        }

        for ((draw, category), &value) in coefficients.indexed_iter() {
            if family == Family::Multinomial {
                if !(value.is_finite() && (0.0..=1.0).contains(&value)) {
                    return Err(RiskError::InvalidProbability { draw, category, value });
                }
            } else if !value.is_finite() {
                return Err(RiskError::config(format!(
                    "coefficient {category} of posterior draw {draw} is non-finite: {value}"
                )));
            }
        }

        Ok(PosteriorDraws { family, coefficients, scale })
    }

    pub fn family(&self) -> Family {
        self.family
    }

    /// Number of available draws H′.
    pub fn n_draws(&self) -> usize {
        self.coefficients.nrows()
    }

    /// Number of coefficient (or category-probability) columns.
    pub fn n_coefficients(&self) -> usize {
        self.coefficients.ncols()
    }

    pub fn coefficients(&self) -> &Array2<f64> {
        &self.coefficients
    }

    pub fn scale(&self) -> Option<&Array1<f64>> {
        self.scale.as_ref()
    }

    /// Scale of draw `h`, if the family has one.
    pub fn scale_at(&self, h: usize) -> Option<f64> {
        self.scale.as_ref().map(|sd| sd[h])
    }

    /// Row `h` of the coefficient matrix (category probabilities for multinomial).
    pub fn draw(&self, h: usize) -> ArrayView1<'_, f64> {
        self.coefficients.row(h)
    }
}
