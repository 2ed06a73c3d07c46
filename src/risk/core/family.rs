//! Distribution families for synthesis models.
//!
//! This module defines [`Family`], which enumerates the supported outcome
//! distributions of the per-variable synthesis models and evaluates their
//! densities given a linear predictor and auxiliary parameters.
//!
//! ## Supported families
//! - [`Family::Normal`]: Gaussian with mean = linear predictor and standard
//!   deviation = the draw's scale.
//! - [`Family::Binomial`]: Bernoulli with success probability
//!   `logistic(linear predictor)`; outcomes are coded 0/1.
//! - [`Family::Poisson`]: Poisson with rate `exp(linear predictor)`.
//! - [`Family::Multinomial`]: categorical outcome whose probabilities are
//!   taken directly from the draw's probability vector, indexed by level
//!   code. No linear predictor and no scale are involved.
//!
//! ## Numerics
//! - Densities are evaluated in log space; [`Family::density`] exponentiates.
//! - Out-of-support outcomes (non-0/1 binomial values, negative or
//!   fractional counts, unknown category codes) have density zero (`-∞`).
//! - Bernoulli log-masses use `-softplus(∓η)` so saturated linear
//!   predictors do not round to `ln 0`.
use crate::{
    numerical_stability::safe_softplus,
    risk::errors::{RiskError, RiskResult},
};
use ndarray::ArrayView1;
use statrs::{
    distribution::{Continuous, Normal},
    function::factorial::ln_factorial,
};
use std::str::FromStr;

/// Outcome distribution of one synthesis model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Normal,
    Binomial,
    Poisson,
    Multinomial,
}

impl Family {
    /// Canonical lower-case name.
    pub const fn name(&self) -> &'static str {
        match self {
            Family::Normal => "normal",
            Family::Binomial => "binomial",
            Family::Poisson => "poisson",
            Family::Multinomial => "multinomial",
        }
    }

    /// Whether posterior draws carry a trailing scale (standard deviation) column.
    pub const fn has_scale(&self) -> bool {
        matches!(self, Family::Normal)
    }

    /// Whether the density depends on a linear predictor (design row × coefficients).
    pub const fn uses_linear_predictor(&self) -> bool {
        !matches!(self, Family::Multinomial)
    }

    /// Evaluate `log f(value | η, σ, π)` for this family.
    ///
    /// # Arguments
    /// - `value`: outcome (0/1 for binomial, count for poisson, level code
    ///   for multinomial).
    /// - `linear_predictor`: `η`; ignored for multinomial.
    /// - `scale`: standard deviation `σ`; required for normal, ignored otherwise.
    /// - `probs`: category probabilities `π`; required for multinomial,
    ///   ignored otherwise.
    ///
    /// # Errors
    /// - [`RiskError::InvalidConfiguration`] when the family's auxiliary
    ///   parameter (`scale` or `probs`) is missing.
    /// - [`RiskError::InvalidNormalParam`] when statrs rejects the scale.
    pub fn log_density(
        &self, value: f64, linear_predictor: f64, scale: Option<f64>,
        probs: Option<ArrayView1<'_, f64>>,
    ) -> RiskResult<f64> {
        match self {
            Family::Normal => {
                let sd = scale.ok_or_else(|| {
                    RiskError::config("normal family requires a scale (standard deviation)")
                })?;
                if !linear_predictor.is_finite() {
                    return Ok(f64::NEG_INFINITY);
                }
                Ok(Normal::new(linear_predictor, sd)?.ln_pdf(value))
            }
            Family::Binomial => Ok(if value == 1.0 {
                -safe_softplus(-linear_predictor)
            } else if value == 0.0 {
                -safe_softplus(linear_predictor)
            } else {
                f64::NEG_INFINITY
            }),
            Family::Poisson => {
                if value < 0.0 || value.fract() != 0.0 {
                    return Ok(f64::NEG_INFINITY);
                }
                let rate = linear_predictor.exp();
                if value == 0.0 {
                    return Ok(-rate);
                }
                Ok(value * linear_predictor - rate - ln_factorial(value as u64))
            }
            Family::Multinomial => {
                let probs = probs.ok_or_else(|| {
                    RiskError::config("multinomial family requires a probability vector")
                })?;
                if value < 0.0 || value.fract() != 0.0 {
                    return Ok(f64::NEG_INFINITY);
                }
                Ok(probs.get(value as usize).map_or(f64::NEG_INFINITY, |p| p.ln()))
            }
        }
    }

    /// Evaluate `f(value | η, σ, π)`; see [`Family::log_density`].
    pub fn density(
        &self, value: f64, linear_predictor: f64, scale: Option<f64>,
        probs: Option<ArrayView1<'_, f64>>,
    ) -> RiskResult<f64> {
        Ok(self.log_density(value, linear_predictor, scale, probs)?.exp())
    }
}

impl FromStr for Family {
    type Err = RiskError;

    /// Parse a family name (case-insensitive). Accepts the aliases used by
    /// common synthesis tooling: `gaussian`, `logit`/`logreg`, `polyreg`.
    fn from_str(s: &str) -> RiskResult<Family> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" | "gaussian" => Ok(Family::Normal),
            "binomial" | "logit" | "logreg" => Ok(Family::Binomial),
            "poisson" => Ok(Family::Poisson),
            "multinomial" | "polyreg" => Ok(Family::Multinomial),
            _ => Err(RiskError::InvalidFamily { family: s.to_string() }),
        }
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical_stability::safe_logistic;
    use approx::assert_relative_eq;
    use ndarray::array;
    use statrs::distribution::{Bernoulli, Discrete, Poisson};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Agreement of each family's density with its textbook / statrs form.
    // - Out-of-support outcomes mapping to zero density.
    // - Missing auxiliary parameters and family-name parsing.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify the normal density against the closed form.
    //
    // Given
    // -----
    // - value 1.5, mean 1.0, sd 2.0.
    //
    // Expect
    // ------
    // - exp(-(0.5)² / 8) / (2 √(2π)).
    fn normal_density_matches_closed_form() {
        let d = Family::Normal.density(1.5, 1.0, Some(2.0), None).unwrap();
        let expected =
            (-(0.5_f64.powi(2)) / 8.0).exp() / (2.0 * (2.0 * std::f64::consts::PI).sqrt());
        assert_relative_eq!(d, expected, epsilon = 1e-14);
    }

    #[test]
    // Purpose
    // -------
    // Verify the Bernoulli mass uses the logistic link and stays finite when
    // saturated.
    //
    // Given
    // -----
    // - η = 0.7 for outcomes 0 and 1; η = 50 for outcome 0; outcome 2.
    //
    // Expect
    // ------
    // - Agreement with statrs' Bernoulli(σ(0.7)); ln f(0 | 50) == -50;
    //   density 0 for outcome 2.
    fn binomial_density_uses_logistic_link() {
        let p = safe_logistic(0.7);
        let bern = Bernoulli::new(p).unwrap();
        assert_relative_eq!(
            Family::Binomial.density(1.0, 0.7, None, None).unwrap(),
            bern.pmf(1),
            epsilon = 1e-14
        );
        assert_relative_eq!(
            Family::Binomial.density(0.0, 0.7, None, None).unwrap(),
            bern.pmf(0),
            epsilon = 1e-14
        );
        assert_relative_eq!(
            Family::Binomial.log_density(0.0, 50.0, None, None).unwrap(),
            -50.0,
            epsilon = 1e-12
        );
        assert_eq!(Family::Binomial.density(2.0, 0.7, None, None).unwrap(), 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Verify the Poisson mass with a log link.
    //
    // Given
    // -----
    // - η = ln 3 and counts 0..6; a fractional and a negative count.
    //
    // Expect
    // ------
    // - Agreement with statrs' Poisson(3); zero mass off the support.
    fn poisson_density_uses_log_link() {
        let pois = Poisson::new(3.0).unwrap();
        for k in 0..6u64 {
            assert_relative_eq!(
                Family::Poisson.log_density(k as f64, 3.0_f64.ln(), None, None).unwrap(),
                pois.ln_pmf(k),
                epsilon = 1e-12
            );
        }
        assert_eq!(Family::Poisson.density(1.5, 0.0, None, None).unwrap(), 0.0);
        assert_eq!(Family::Poisson.density(-1.0, 0.0, None, None).unwrap(), 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Verify the multinomial lookup ignores the linear predictor.
    //
    // Given
    // -----
    // - π = [0.2, 0.5, 0.3] and codes 1 and 3.
    //
    // Expect
    // ------
    // - f(1) = 0.5 regardless of η; f(3) = 0.
    fn multinomial_density_is_direct_lookup() {
        let probs = array![0.2, 0.5, 0.3];
        for eta in [-5.0, 0.0, 5.0] {
            assert_relative_eq!(
                Family::Multinomial.density(1.0, eta, None, Some(probs.view())).unwrap(),
                0.5,
                epsilon = 1e-15
            );
        }
        assert_eq!(Family::Multinomial.density(3.0, 0.0, None, Some(probs.view())).unwrap(), 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Verify errors for missing or invalid auxiliary parameters.
    //
    // Given
    // -----
    // - Normal without scale, normal with sd = 0, multinomial without probs.
    //
    // Expect
    // ------
    // - `InvalidConfiguration`, `InvalidNormalParam`, `InvalidConfiguration`.
    fn missing_auxiliary_parameters_are_errors() {
        assert!(matches!(
            Family::Normal.log_density(0.0, 0.0, None, None),
            Err(RiskError::InvalidConfiguration { .. })
        ));
        assert_eq!(
            Family::Normal.log_density(0.0, 0.0, Some(0.0), None),
            Err(RiskError::InvalidNormalParam)
        );
        assert!(matches!(
            Family::Multinomial.log_density(0.0, 0.0, None, None),
            Err(RiskError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Verify family-name parsing.
    //
    // Given
    // -----
    // - Canonical names, aliases, mixed case, and an unsupported family.
    //
    // Expect
    // ------
    // - The matching variant, and `InvalidFamily` for "gamma".
    fn family_from_str_accepts_aliases_and_rejects_unknown() {
        assert_eq!("Normal".parse::<Family>().unwrap(), Family::Normal);
        assert_eq!("logit".parse::<Family>().unwrap(), Family::Binomial);
        assert_eq!(" poisson ".parse::<Family>().unwrap(), Family::Poisson);
        assert_eq!("polyreg".parse::<Family>().unwrap(), Family::Multinomial);
        assert_eq!(
            "gamma".parse::<Family>(),
            Err(RiskError::InvalidFamily { family: "gamma".to_string() })
        );
        assert_eq!(Family::Binomial.to_string(), "binomial");
    }
}
