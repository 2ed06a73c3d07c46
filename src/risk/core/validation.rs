//! Cross-input validation for a risk estimate.
//!
//! Purpose
//! -------
//! Check, once and before any record is processed, that the confidential
//! dataset, the synthetic replicates, the synthesis steps, and the options
//! are mutually consistent. Everything downstream indexes without
//! re-checking.
//!
//! Key behaviors
//! -------------
//! - [`validate_inputs`] runs every check and returns the first violation.
//!
//! Invariants & assumptions
//! ------------------------
//! After a successful call:
//! - There is at least one step and one synthetic replicate.
//! - Step variables are unique and present in every dataset.
//! - Step `j` predicts only from columns that are not synthesized or are
//!   synthesized at an earlier step.
//! - Every step has the same number of draws H′, and `iterations ≤ H′`.
//! - Linear-predictor steps have one coefficient per design entry.
//! - Multinomial draws cover every category code that occurs.
//! - Per-step options cover exactly the number of steps, and every
//!   continuous step has an explicit guess list when explicit guesses are
//!   used.
use crate::risk::{
    core::{
        data::Dataset,
        family::Family,
        options::{GuessRange, RiskOptions},
        step::SynthesisStep,
    },
    errors::{RiskError, RiskResult},
};

/// Validate every cross-input constraint of an estimate.
///
/// # Errors
/// - [`RiskError::InvalidConfiguration`] for structural problems.
/// - [`RiskError::UnknownColumn`] for step or predictor columns missing
///   from a dataset.
/// - [`RiskError::DesignWidthMismatch`] for coefficient/design disagreement.
pub fn validate_inputs(
    confidential: &Dataset, synthetic: &[Dataset], steps: &[SynthesisStep], options: &RiskOptions,
) -> RiskResult<()> {
    if steps.is_empty() {
        return Err(RiskError::config("at least one synthesis step is required"));
    }
    if synthetic.is_empty() {
        return Err(RiskError::config("at least one synthetic dataset is required"));
    }
    options.validate()?;
    if !options.matches_steps(steps.len()) {
        return Err(RiskError::config(format!(
            "per-step guess settings must have exactly {} entries",
            steps.len()
        )));
    }

    let datasets = || std::iter::once(confidential).chain(synthetic.iter());
    for (j, step) in steps.iter().enumerate() {
        let variable = step.variable();
        if steps[..j].iter().any(|s| s.variable() == variable) {
            return Err(RiskError::config(format!("variable '{variable}' is synthesized twice")));
        }
        for ds in datasets() {
            ds.column(variable)?;
            for col in step.predictors().columns() {
                ds.column(col)?;
            }
        }
        for col in step.predictors().columns() {
            if steps[j..].iter().any(|s| s.variable() == col) {
                return Err(RiskError::config(format!(
                    "step {j} ('{variable}') uses '{col}', which is not synthesized before it"
                )));
            }
        }
        check_draws(step, j, steps, options)?;
        check_categories(step, datasets())?;

        let continuous = !step.is_categorical() && !confidential.column(variable)?.is_categorical();
        if let GuessRange::Explicit(lists) = &options.guess_range {
            if continuous && lists.get(j).is_none_or(Option::is_none) {
                return Err(RiskError::config(format!(
                    "explicit guesses are required for continuous step {j} ('{variable}')"
                )));
            }
        }
    }
    Ok(())
}

fn check_draws(
    step: &SynthesisStep, j: usize, steps: &[SynthesisStep], options: &RiskOptions,
) -> RiskResult<()> {
    let n_draws = step.draws().n_draws();
    let first = steps[0].draws().n_draws();
    if n_draws != first {
        return Err(RiskError::config(format!(
            "step {j} ('{}') has {n_draws} posterior draws; step 0 has {first}",
            step.variable()
        )));
    }
    if options.iterations > n_draws {
        return Err(RiskError::config(format!(
            "iterations ({}) exceed the {n_draws} available posterior draws",
            options.iterations
        )));
    }
    if step.family().uses_linear_predictor() {
        let width = step.predictors().width();
        if width != step.draws().n_coefficients() {
            return Err(RiskError::DesignWidthMismatch {
                variable: step.variable().to_string(),
                expected: width,
                actual: step.draws().n_coefficients(),
            });
        }
    }
    Ok(())
}

fn check_categories<'a>(
    step: &SynthesisStep, datasets: impl Iterator<Item = &'a Dataset>,
) -> RiskResult<()> {
    if step.family() != Family::Multinomial {
        return Ok(());
    }
    let n_probs = step.draws().n_coefficients();
    for ds in datasets {
        let column = ds.column(step.variable())?;
        let declared = column.levels().map_or(0, <[String]>::len);
        let observed = column.values().iter().fold(0.0_f64, |m, &v| m.max(v + 1.0)) as usize;
        let needed = declared.max(observed);
        if n_probs < needed {
            return Err(RiskError::config(format!(
                "multinomial draws for '{}' have {n_probs} probabilities; {needed} categories occur",
                step.variable()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::core::{data::Column, design::PredictorSpec, options::StepValues};
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Acceptance of a consistent set of inputs.
    // - Each structural rejection: ordering, duplicates, draw counts,
    //   widths, category coverage, per-step lengths, explicit lists.
    // -------------------------------------------------------------------------

    fn data() -> Dataset {
        Dataset::new(vec![
            Column::numeric("age", array![30.0, 40.0]),
            Column::numeric("income", array![10.0, 20.0]),
            Column::categorical("edu", &[0, 2], vec!["a".into(), "b".into(), "c".into()]).unwrap(),
        ])
        .unwrap()
    }

    fn income_step(n_draws: usize) -> SynthesisStep {
        let mut draws = ndarray::Array2::<f64>::zeros((n_draws, 3));
        draws.column_mut(2).fill(1.0);
        SynthesisStep::from_family_name(
            "income",
            PredictorSpec::intercept_only().with_numeric("age"),
            "normal",
            draws,
            false,
        )
        .unwrap()
    }

    fn edu_step(n_probs: usize) -> SynthesisStep {
        let draws = ndarray::Array2::from_elem((4, n_probs), 1.0 / n_probs as f64);
        SynthesisStep::from_family_name(
            "edu",
            PredictorSpec::intercept_only(),
            "multinomial",
            draws,
            false,
        )
        .unwrap()
    }

    fn opts(iterations: usize) -> RiskOptions {
        RiskOptions { iterations, ..RiskOptions::default() }
    }

    #[test]
    // Purpose
    // -------
    // Verify that consistent inputs pass.
    //
    // Given
    // -----
    // - income ~ age, then edu; 4 draws each; 3 iterations.
    //
    // Expect
    // ------
    // - `Ok(())`.
    fn consistent_inputs_pass() {
        let steps = vec![income_step(4), edu_step(3)];
        assert_eq!(validate_inputs(&data(), &[data()], &steps, &opts(3)), Ok(()));
    }

    #[test]
    // Purpose
    // -------
    // Verify the ordering and uniqueness rules.
    //
    // Given
    // -----
    // - A step predicting from a later step's variable; a duplicated step.
    //
    // Expect
    // ------
    // - `InvalidConfiguration` in both cases.
    fn ordering_and_duplicates_are_rejected() {
        let late = SynthesisStep::from_family_name(
            "age",
            PredictorSpec::intercept_only().with_numeric("income"),
            "normal",
            array![[0.0, 0.0, 1.0], [0.0, 0.0, 1.0], [0.0, 0.0, 1.0], [0.0, 0.0, 1.0]],
            false,
        )
        .unwrap();
        let steps = vec![late, income_step(4)];
        assert!(matches!(
            validate_inputs(&data(), &[data()], &steps, &opts(3)),
            Err(RiskError::InvalidConfiguration { .. })
        ));

        let steps = vec![income_step(4), income_step(4)];
        assert!(matches!(
            validate_inputs(&data(), &[data()], &steps, &opts(3)),
            Err(RiskError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Verify draw-count and width checks.
    //
    // Given
    // -----
    // - Steps with 4 and 5 draws; 5 iterations for 4 draws; a width-1
    //   design with 2 coefficients.
    //
    // Expect
    // ------
    // - `InvalidConfiguration`, `InvalidConfiguration`, `DesignWidthMismatch`.
    fn draw_counts_and_widths_are_checked() {
        let steps = vec![income_step(4), edu_step(3)];
        let five = vec![income_step(4), {
            let draws = ndarray::Array2::from_elem((5, 3), 1.0 / 3.0);
            SynthesisStep::from_family_name(
                "edu",
                PredictorSpec::intercept_only(),
                "multinomial",
                draws,
                false,
            )
            .unwrap()
        }];
        assert!(validate_inputs(&data(), &[data()], &five, &opts(3)).is_err());
        assert!(validate_inputs(&data(), &[data()], &steps, &opts(5)).is_err());

        let narrow = vec![SynthesisStep::from_family_name(
            "income",
            PredictorSpec::intercept_only(),
            "normal",
            array![[0.0, 0.0, 1.0]],
            false,
        )
        .unwrap()];
        assert_eq!(
            validate_inputs(&data(), &[data()], &narrow, &opts(1)),
            Err(RiskError::DesignWidthMismatch {
                variable: "income".into(),
                expected: 1,
                actual: 2,
            })
        );
    }

    #[test]
    // Purpose
    // -------
    // Verify category coverage and missing columns.
    //
    // Given
    // -----
    // - edu draws over 2 categories for 3 declared levels; a synthetic
    //   replicate without `age`.
    //
    // Expect
    // ------
    // - `InvalidConfiguration`; `UnknownColumn { age }`.
    fn categories_and_columns_are_checked() {
        assert!(validate_inputs(&data(), &[data()], &[edu_step(2)], &opts(3)).is_err());

        let partial = Dataset::new(vec![
            Column::numeric("income", array![1.0]),
            Column::categorical("edu", &[0], vec!["a".into(), "b".into(), "c".into()]).unwrap(),
        ])
        .unwrap();
        assert_eq!(
            validate_inputs(&data(), &[partial], &[income_step(4)], &opts(3)),
            Err(RiskError::UnknownColumn { column: "age".into() })
        );
    }

    #[test]
    // Purpose
    // -------
    // Verify per-step option lengths and explicit-list coverage.
    //
    // Given
    // -----
    // - Per-step counts of length 1 for 2 steps; explicit lists lacking the
    //   continuous income step.
    //
    // Expect
    // ------
    // - `InvalidConfiguration` in both cases.
    fn per_step_options_are_checked() {
        let steps = vec![income_step(4), edu_step(3)];
        let short = RiskOptions { guess_counts: StepValues::PerStep(vec![3]), ..opts(3) };
        assert!(validate_inputs(&data(), &[data()], &steps, &short).is_err());

        let explicit = RiskOptions {
            guess_range: GuessRange::Explicit(vec![None, None]),
            ..opts(3)
        };
        assert!(validate_inputs(&data(), &[data()], &steps, &explicit).is_err());
    }
}
