//! Synthesis steps — one sequentially synthesized variable and its model.
//!
//! Purpose
//! -------
//! Describe one step of a sequential synthesis: the outcome variable, the
//! design transform of its predictors, its distribution family, and the
//! posterior draws of its parameters. Provide the draw-broadcast density
//! evaluations the importance sampler is built from.
//!
//! Key behaviors
//! -------------
//! - [`SynthesisStep::log_densities`] evaluates `log f(value | x, θ_h)` for one
//!   record across the first `n` posterior draws (a vector over draws).
//! - [`SynthesisStep::log_likelihood`] evaluates
//!   `Σ_r log f(y_r | x_r, θ_h)` over every row of a dataset, again as a
//!   vector over draws.
//!
//! Invariants & assumptions
//! ------------------------
//! - Steps are immutable once constructed and only read by the estimators.
//! - For families with a linear predictor, the design width must equal the
//!   number of coefficient columns; a mismatch is reported as
//!   [`RiskError::DesignWidthMismatch`] rather than panicking inside `dot`.
//! - `n` larger than the available draw count is clamped to H′.
use crate::risk::{
    core::{data::Dataset, design::DesignRow, draws::PosteriorDraws, family::Family},
    errors::{RiskError, RiskResult},
};
use ndarray::{Array1, Array2, s};

/// One sequentially synthesized variable.
#[derive(Debug)]
pub struct SynthesisStep {
    variable: String,
    predictors: Box<dyn DesignRow>,
    draws: PosteriorDraws,
    categorical: bool,
}

impl SynthesisStep {
    /// Construct a step; the family is taken from `draws`.
    ///
    /// `categorical` forces level-based guesses even when the outcome column
    /// declares no levels.
    pub fn new(
        variable: impl Into<String>, predictors: impl DesignRow + 'static, draws: PosteriorDraws,
        categorical: bool,
    ) -> SynthesisStep {
        SynthesisStep {
            variable: variable.into(),
            predictors: Box::new(predictors),
            draws,
            categorical,
        }
    }

    /// Construct a step from a family name and a raw draw matrix.
    ///
    /// # Errors
    /// - [`RiskError::InvalidFamily`] for an unsupported family name.
    /// - Any error of [`PosteriorDraws::from_matrix`].
    pub fn from_family_name(
        variable: impl Into<String>, predictors: impl DesignRow + 'static, family: &str,
        draws: Array2<f64>, categorical: bool,
    ) -> RiskResult<SynthesisStep> {
        let family: Family = family.parse()?;
        let draws = PosteriorDraws::from_matrix(draws, family)?;
        Ok(SynthesisStep::new(variable, predictors, draws, categorical))
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn predictors(&self) -> &dyn DesignRow {
        self.predictors.as_ref()
    }

    pub fn family(&self) -> Family {
        self.draws.family()
    }

    pub fn draws(&self) -> &PosteriorDraws {
        &self.draws
    }

    /// Whether the step was flagged categorical by the caller.
    pub fn is_categorical(&self) -> bool {
        self.categorical
    }

    /// `log f(value | x(row), θ_h)` for `h = 0..n`.
    ///
    /// `row` must be laid out in `dataset`'s column order.
    pub fn log_densities(
        &self, value: f64, dataset: &Dataset, row: &[f64], n: usize,
    ) -> RiskResult<Array1<f64>> {
        let n = n.min(self.draws.n_draws());
        let family = self.family();
        if !family.uses_linear_predictor() {
            return (0..n)
                .map(|h| family.log_density(value, 0.0, None, Some(self.draws.draw(h))))
                .collect();
        }

        let x = self.predictors.design_row(dataset, row)?;
        self.check_width(x.len())?;
        let eta = self.draws.coefficients().slice(s![..n, ..]).dot(&x);
        eta.iter()
            .enumerate()
            .map(|(h, &lp)| family.log_density(value, lp, self.draws.scale_at(h), None))
            .collect()
    }

    /// `Σ_r log f(y_r | x(row_r), θ_h)` over all rows of `dataset`, for
    /// `h = 0..n`, where `y` is this step's outcome column.
    pub fn log_likelihood(&self, dataset: &Dataset, n: usize) -> RiskResult<Array1<f64>> {
        let n = n.min(self.draws.n_draws());
        let family = self.family();
        let y = dataset.column(&self.variable)?.values();
        let mut out = Array1::<f64>::zeros(n);

        if !family.uses_linear_predictor() {
            for (h, total) in out.iter_mut().enumerate() {
                let probs = self.draws.draw(h);
                for &value in y {
                    *total += family.log_density(value, 0.0, None, Some(probs))?;
                }
            }
            return Ok(out);
        }

        let design = self.predictors.design_matrix(dataset)?;
        self.check_width(design.ncols())?;
        let eta = design.dot(&self.draws.coefficients().slice(s![..n, ..]).t());
        for (h, total) in out.iter_mut().enumerate() {
            let scale = self.draws.scale_at(h);
            for (r, &value) in y.iter().enumerate() {
                *total += family.log_density(value, eta[[r, h]], scale, None)?;
            }
        }
        Ok(out)
    }

    fn check_width(&self, width: usize) -> RiskResult<()> {
        if width != self.draws.n_coefficients() {
            return Err(RiskError::DesignWidthMismatch {
                variable: self.variable.clone(),
                expected: width,
                actual: self.draws.n_coefficients(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::core::{data::Column, design::PredictorSpec};
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Per-draw density vectors for linear-predictor and lookup families.
    // - Dataset log-likelihood as a sum of per-row log densities.
    // - Draw-count clamping, width mismatch, and family-name construction.
    // -------------------------------------------------------------------------

    fn data() -> Dataset {
        Dataset::new(vec![
            Column::numeric("x", array![1.0, 2.0]),
            Column::numeric("y", array![0.5, 1.5]),
            Column::categorical("c", &[0, 2], vec!["a".into(), "b".into(), "c".into()]).unwrap(),
        ])
        .unwrap()
    }

    fn normal_step() -> SynthesisStep {
        // y ~ N(b0 + b1 x, sd)
        let draws = array![[0.0, 1.0, 1.0], [0.5, 0.5, 2.0], [1.0, 0.0, 0.5]];
        SynthesisStep::from_family_name(
            "y",
            PredictorSpec::intercept_only().with_numeric("x"),
            "normal",
            draws,
            false,
        )
        .unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Verify per-draw log densities for a normal step.
    //
    // Given
    // -----
    // - Three draws and record 0 (x = 1), evaluated at value 0.5 for the
    //   first two draws only.
    //
    // Expect
    // ------
    // - Two entries equal to ln N(0.5; 1, 1) and ln N(0.5; 1, 2).
    fn log_densities_broadcast_over_requested_draws() {
        let step = normal_step();
        let ds = data();
        let ld = step.log_densities(0.5, &ds, &ds.row(0).unwrap(), 2).unwrap();
        assert_eq!(ld.len(), 2);
        let n0 = Family::Normal.log_density(0.5, 1.0, Some(1.0), None).unwrap();
        let n1 = Family::Normal.log_density(0.5, 1.0, Some(2.0), None).unwrap();
        assert_relative_eq!(ld[0], n0, epsilon = 1e-14);
        assert_relative_eq!(ld[1], n1, epsilon = 1e-14);

        let clamped = step.log_densities(0.5, &ds, &ds.row(0).unwrap(), 99).unwrap();
        assert_eq!(clamped.len(), 3);
    }

    #[test]
    // Purpose
    // -------
    // Verify that the dataset log-likelihood sums per-row log densities.
    //
    // Given
    // -----
    // - The normal step and the two-row dataset.
    //
    // Expect
    // ------
    // - Entry h equals Σ_r log_densities(y_r, row_r)[h].
    fn log_likelihood_sums_rows() {
        let step = normal_step();
        let ds = data();
        let ll = step.log_likelihood(&ds, 3).unwrap();
        for h in 0..3 {
            let expected: f64 = (0..ds.n_rows())
                .map(|r| {
                    let row = ds.row(r).unwrap();
                    step.log_densities(row[1], &ds, &row, 3).unwrap()[h]
                })
                .sum();
            assert_relative_eq!(ll[h], expected, epsilon = 1e-12);
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify the multinomial lookup path.
    //
    // Given
    // -----
    // - Two probability draws over three levels of column `c` (codes 0, 2).
    //
    // Expect
    // ------
    // - log-likelihood of draw h equals ln π_h[0] + ln π_h[2].
    fn multinomial_step_uses_draw_probabilities() {
        let draws = array![[0.2, 0.3, 0.5], [0.6, 0.3, 0.1]];
        let step = SynthesisStep::from_family_name(
            "c",
            PredictorSpec::intercept_only(),
            "multinomial",
            draws,
            true,
        )
        .unwrap();
        let ds = data();
        let ll = step.log_likelihood(&ds, 2).unwrap();
        assert_relative_eq!(ll[0], 0.2_f64.ln() + 0.5_f64.ln(), epsilon = 1e-14);
        assert_relative_eq!(ll[1], 0.6_f64.ln() + 0.1_f64.ln(), epsilon = 1e-14);
        assert!(step.is_categorical());
    }

    #[test]
    // Purpose
    // -------
    // Verify error reporting for width mismatch and unknown families.
    //
    // Given
    // -----
    // - A poisson step with 1 coefficient column but a width-2 design; the
    //   family name "gamma".
    //
    // Expect
    // ------
    // - `DesignWidthMismatch` and `InvalidFamily`.
    fn width_mismatch_and_unknown_family_are_errors() {
        let step = SynthesisStep::from_family_name(
            "y",
            PredictorSpec::intercept_only().with_numeric("x"),
            "poisson",
            array![[0.1], [0.2]],
            false,
        )
        .unwrap();
        let ds = data();
        assert_eq!(
            step.log_densities(1.0, &ds, &ds.row(0).unwrap(), 2),
            Err(RiskError::DesignWidthMismatch { variable: "y".into(), expected: 2, actual: 1 })
        );

        let err = SynthesisStep::from_family_name(
            "y",
            PredictorSpec::intercept_only(),
            "gamma",
            array![[0.1]],
            false,
        )
        .unwrap_err();
        assert_eq!(err, RiskError::InvalidFamily { family: "gamma".into() });
    }
}
