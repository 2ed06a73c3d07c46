//! Risk options — configuration for attribute-risk estimation.
//!
//! Purpose
//! -------
//! Collect the configuration knobs of a risk estimate in one place: the
//! number of posterior draws to use, how many guesses to consider per
//! continuous variable, how the guess range is constructed, and the
//! optional prior weight favoring the true combination.
//!
//! Key behaviors
//! -------------
//! - Represent "one value for every step, or one per step" settings via
//!   [`StepValues`] (guess counts and guess bounds).
//! - Represent the guess-range policy via [`GuessRange`]; exactly one policy
//!   applies, enforced by construction and by [`GuessRange::from_parts`]
//!   when callers hold the policies as optional components.
//! - Bundle everything in [`RiskOptions`], validated at construction.
//!
//! Invariants & assumptions
//! ------------------------
//! - `iterations ≥ 1`; every guess count `≥ 1`.
//! - Bounds are finite; percent and additive bounds are non-negative;
//!   absolute bounds satisfy `low ≤ high`.
//! - Explicit guess lists are non-empty, finite, and free of duplicates.
//! - The prior weight, when present, is finite and `> 0`.
//! - Cross-input checks (per-step vectors matching the number of steps,
//!   iterations not exceeding the available draws) are performed by
//!   [`crate::risk::core::validation::validate_inputs`], not here.
//!
//! Conventions
//! -----------
//! - Per-step vectors are indexed by synthesis-step position (0-based),
//!   including categorical steps, whose entries are ignored.
//! - Percent bounds are fractions: `(0.1, 0.2)` spans
//!   `[0.9 · true, 1.2 · true]`.
//!
//! Downstream usage
//! ----------------
//! - Build a [`RiskOptions`] once (or start from `RiskOptions::default()`)
//!   and pass it to `estimate_risk`.
//!
//! Testing notes
//! -------------
//! - Unit tests verify the documented defaults, the "exactly one policy"
//!   rule of `GuessRange::from_parts`, and each rejection branch of
//!   `RiskOptions::new`.
use crate::risk::errors::{RiskError, RiskResult};

/// A setting given once for every step or once per step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepValues<T> {
    /// Same value for every step.
    Uniform(T),
    /// One value per step, indexed by step position.
    PerStep(Vec<T>),
}

impl<T> StepValues<T> {
    /// Value for step `step`, or `None` when a per-step vector is too short.
    pub fn get(&self, step: usize) -> Option<&T> {
        match self {
            StepValues::Uniform(v) => Some(v),
            StepValues::PerStep(vs) => vs.get(step),
        }
    }

    /// Whether the setting covers exactly `n_steps` steps.
    pub fn matches_steps(&self, n_steps: usize) -> bool {
        match self {
            StepValues::Uniform(_) => true,
            StepValues::PerStep(vs) => vs.len() == n_steps,
        }
    }

    fn values(&self) -> &[T] {
        match self {
            StepValues::Uniform(v) => std::slice::from_ref(v),
            StepValues::PerStep(vs) => vs,
        }
    }
}

/// Guess counts `D_j` for continuous steps.
pub type GuessCounts = StepValues<usize>;

/// `(low, high)` bound pairs.
pub type Bounds = StepValues<(f64, f64)>;

/// How guesses are constructed for continuous steps.
#[derive(Debug, Clone, PartialEq)]
pub enum GuessRange {
    /// `[true · (1 − low), true · (1 + high)]`, split into `D_j` points.
    Percent(Bounds),
    /// `[true − low, true + high]`, split into `D_j` points.
    Additive(Bounds),
    /// `[low, high]`, split into `D_j` points.
    Absolute(Bounds),
    /// Caller-supplied guesses, one list per step (`None` for categorical steps).
    Explicit(Vec<Option<Vec<f64>>>),
}

impl Default for GuessRange {
    /// Percent bounds of ±10 % for every continuous step.
    fn default() -> Self {
        GuessRange::Percent(StepValues::Uniform((0.1, 0.1)))
    }
}

impl GuessRange {
    /// Select the guess-range policy from optional components.
    ///
    /// Errors
    /// ------
    /// - `RiskError::InvalidConfiguration` when more than one component is
    ///   supplied.
    ///
    /// Notes
    /// -----
    /// - With no component, the default percent bounds apply.
    pub fn from_parts(
        percent: Option<Bounds>, additive: Option<Bounds>, absolute: Option<Bounds>,
        explicit: Option<Vec<Option<Vec<f64>>>>,
    ) -> RiskResult<GuessRange> {
        let supplied = usize::from(percent.is_some())
            + usize::from(additive.is_some())
            + usize::from(absolute.is_some())
            + usize::from(explicit.is_some());
        if supplied > 1 {
            return Err(RiskError::config(format!(
                "exactly one guess-range policy may be supplied; got {supplied}"
            )));
        }
        Ok(match (percent, additive, absolute, explicit) {
            (Some(b), ..) => GuessRange::Percent(b),
            (_, Some(b), ..) => GuessRange::Additive(b),
            (_, _, Some(b), _) => GuessRange::Absolute(b),
            (_, _, _, Some(lists)) => GuessRange::Explicit(lists),
            _ => GuessRange::default(),
        })
    }

    /// Check value-level constraints of the policy.
    pub fn validate(&self) -> RiskResult<()> {
        match self {
            GuessRange::Percent(b) | GuessRange::Additive(b) => {
                for &(low, high) in b.values() {
                    if !(low.is_finite() && high.is_finite() && low >= 0.0 && high >= 0.0) {
                        return Err(RiskError::config(format!(
                            "relative guess bounds must be finite and non-negative; got ({low}, {high})"
                        )));
                    }
                }
            }
            GuessRange::Absolute(b) => {
                for &(low, high) in b.values() {
                    if !(low.is_finite() && high.is_finite() && low <= high) {
                        return Err(RiskError::config(format!(
                            "absolute guess bounds must be finite with low <= high; got ({low}, {high})"
                        )));
                    }
                }
            }
            GuessRange::Explicit(lists) => {
                for (step, list) in lists.iter().enumerate() {
                    let Some(list) = list else { continue };
                    if list.is_empty() {
                        return Err(RiskError::config(format!(
                            "explicit guesses for step {step} are empty"
                        )));
                    }
                    if let Some(v) = list.iter().find(|v| !v.is_finite()) {
                        return Err(RiskError::config(format!(
                            "explicit guesses for step {step} contain a non-finite value: {v}"
                        )));
                    }
                    for (i, v) in list.iter().enumerate() {
                        if list[..i].contains(v) {
                            return Err(RiskError::config(format!(
                                "explicit guesses for step {step} repeat the value {v}"
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// RiskOptions — estimation-time configuration for attribute risk.
///
/// Fields
/// ------
/// - `iterations`: `usize`
///   Number H of posterior draws used for the per-draw weights
///   (`1 ≤ H ≤ H′`).
/// - `guess_counts`: [`GuessCounts`]
///   Number of guesses `D_j` for each continuous step.
/// - `guess_range`: [`GuessRange`]
///   Guess construction policy for continuous steps.
/// - `prior_weight`: `Option<f64>`
///   Optional influence weight `w > 0` of the simple prior favoring the
///   true combination.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskOptions {
    pub iterations: usize,
    pub guess_counts: GuessCounts,
    pub guess_range: GuessRange,
    pub prior_weight: Option<f64>,
}

impl RiskOptions {
    /// Construct validated [`RiskOptions`].
    ///
    /// Errors
    /// ------
    /// - `RiskError::InvalidConfiguration` when `iterations == 0`, a guess
    ///   count is zero, the guess range fails [`GuessRange::validate`], or
    ///   the prior weight is not finite and `> 0`.
    pub fn new(
        iterations: usize, guess_counts: GuessCounts, guess_range: GuessRange,
        prior_weight: Option<f64>,
    ) -> RiskResult<RiskOptions> {
        let opts = RiskOptions { iterations, guess_counts, guess_range, prior_weight };
        opts.validate()?;
        Ok(opts)
    }

    /// Re-check the value-level constraints; fields are public and may have
    /// been edited after construction.
    pub fn validate(&self) -> RiskResult<()> {
        if self.iterations == 0 {
            return Err(RiskError::config("iterations must be at least 1"));
        }
        if self.guess_counts.values().contains(&0) {
            return Err(RiskError::config("guess counts must be at least 1"));
        }
        self.guess_range.validate()?;
        if let Some(w) = self.prior_weight {
            if !(w.is_finite() && w > 0.0) {
                return Err(RiskError::config(format!(
                    "prior weight must be finite and > 0; got {w}"
                )));
            }
        }
        Ok(())
    }

    /// Whether every per-step setting covers exactly `n_steps` steps.
    pub fn matches_steps(&self, n_steps: usize) -> bool {
        let range_ok = match &self.guess_range {
            GuessRange::Percent(b) | GuessRange::Additive(b) | GuessRange::Absolute(b) => {
                b.matches_steps(n_steps)
            }
            GuessRange::Explicit(lists) => lists.len() == n_steps,
        };
        range_ok && self.guess_counts.matches_steps(n_steps)
    }
}

impl Default for RiskOptions {
    /// 100 iterations, 11 guesses per continuous step, ±10 % percent
    /// bounds, no prior.
    fn default() -> Self {
        RiskOptions {
            iterations: 100,
            guess_counts: StepValues::Uniform(11),
            guess_range: GuessRange::default(),
            prior_weight: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Documented defaults of `RiskOptions` and `GuessRange`.
    // - The "exactly one policy" rule of `GuessRange::from_parts`.
    // - Rejection branches of `RiskOptions::new` and `GuessRange::validate`.
    //
    // They intentionally DO NOT cover:
    // - Cross-input checks against steps and draws; see `validation`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify the documented defaults.
    //
    // Given
    // -----
    // - `RiskOptions::default()`.
    //
    // Expect
    // ------
    // - 100 iterations, uniform 11 guesses, ±10 % percent bounds, no prior.
    fn defaults_match_documentation() {
        let opts = RiskOptions::default();
        assert_eq!(opts.iterations, 100);
        assert_eq!(opts.guess_counts, StepValues::Uniform(11));
        assert_eq!(opts.guess_range, GuessRange::Percent(StepValues::Uniform((0.1, 0.1))));
        assert!(opts.prior_weight.is_none());
    }

    #[test]
    // Purpose
    // -------
    // Verify policy selection from optional parts.
    //
    // Given
    // -----
    // - No parts, only absolute bounds, and additive + explicit together.
    //
    // Expect
    // ------
    // - Default percent, `Absolute`, and `InvalidConfiguration`.
    fn from_parts_requires_at_most_one_policy() {
        assert_eq!(GuessRange::from_parts(None, None, None, None).unwrap(), GuessRange::default());

        let abs = StepValues::Uniform((0.0, 10.0));
        assert_eq!(
            GuessRange::from_parts(None, None, Some(abs.clone()), None).unwrap(),
            GuessRange::Absolute(abs)
        );

        let err = GuessRange::from_parts(
            None,
            Some(StepValues::Uniform((1.0, 1.0))),
            None,
            Some(vec![Some(vec![1.0])]),
        )
        .unwrap_err();
        assert!(matches!(err, RiskError::InvalidConfiguration { .. }));
    }

    #[test]
    // Purpose
    // -------
    // Verify per-step lookup semantics of `StepValues`.
    //
    // Given
    // -----
    // - A uniform and a two-entry per-step setting.
    //
    // Expect
    // ------
    // - Uniform answers every step; per-step answers in range only.
    fn step_values_lookup() {
        let u = StepValues::Uniform(5_usize);
        assert_eq!(u.get(10), Some(&5));
        assert!(u.matches_steps(3));

        let p = StepValues::PerStep(vec![3_usize, 4]);
        assert_eq!(p.get(1), Some(&4));
        assert_eq!(p.get(2), None);
        assert!(p.matches_steps(2));
        assert!(!p.matches_steps(3));
    }

    #[test]
    // Purpose
    // -------
    // Verify the rejection branches of `RiskOptions::new`.
    //
    // Given
    // -----
    // - Zero iterations, a zero guess count, negative percent bounds,
    //   inverted absolute bounds, duplicate explicit guesses, and a zero
    //   prior weight.
    //
    // Expect
    // ------
    // - `InvalidConfiguration` in every case; a valid set is accepted.
    fn new_rejects_invalid_settings() {
        let ok = |it, counts, range, prior| RiskOptions::new(it, counts, range, prior);
        let pct = GuessRange::default();

        assert!(ok(0, StepValues::Uniform(3), pct.clone(), None).is_err());
        assert!(ok(10, StepValues::PerStep(vec![3, 0]), pct.clone(), None).is_err());
        let negative = GuessRange::Percent(StepValues::Uniform((-0.1, 0.1)));
        assert!(ok(10, StepValues::Uniform(3), negative, None).is_err());
        let inverted = GuessRange::Absolute(StepValues::Uniform((5.0, 1.0)));
        assert!(ok(10, StepValues::Uniform(3), inverted, None).is_err());
        assert!(
            ok(10, StepValues::Uniform(3), GuessRange::Explicit(vec![Some(vec![1.0, 1.0])]), None)
                .is_err()
        );
        assert!(ok(10, StepValues::Uniform(3), pct.clone(), Some(0.0)).is_err());

        let valid = ok(10, StepValues::Uniform(3), pct, Some(2.0)).unwrap();
        assert_eq!(valid.prior_weight, Some(2.0));
    }
}
