//! Guess grids — candidate values an intruder considers for each
//! synthesized variable of one confidential record.
//!
//! Purpose
//! -------
//! Build, for one record, the ordered candidate sequence of every synthesis
//! step and guarantee that the record's true value appears in each sequence
//! exactly once, so the true combination is an identifiable grid cell.
//!
//! Key behaviors
//! -------------
//! - Categorical steps guess every level: codes `0..L` when the outcome
//!   column declares levels, otherwise the sorted distinct values observed
//!   in the confidential column.
//! - Continuous steps guess `D_j` evenly spaced points over a range chosen
//!   by the [`GuessRange`] policy, or an explicit caller list.
//! - Poisson steps round continuous guesses to whole counts, since
//!   fractional counts carry no mass.
//! - Repeated guesses are collapsed to their first occurrence, for every
//!   family. A degenerate range (percent bounds around a true value of 0,
//!   zero-width additive bounds) therefore yields a single guess.
//! - When the true value is absent, the element nearest the median of the
//!   sequence is replaced by it and a warning is logged.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every returned [`GuessSet`] contains its true value exactly once and
//!   reports its position via [`GuessSet::true_index`].
//! - [`GuessSet::new`] itself does not collapse repeats: a caller-built
//!   sequence holding the true value more than once is rejected with
//!   [`RiskError::DuplicateTrueValue`].
//! - Values are compared exactly.
//!
//! Conventions
//! -----------
//! - Percent and additive ranges are sorted so `low ≤ high` even for
//!   negative true values.
//! - For even-length sequences, the median is the mean of the two middle
//!   elements; ties in distance go to the earliest element.
use crate::risk::{
    core::{
        data::Dataset,
        family::Family,
        options::{GuessRange, RiskOptions},
        step::SynthesisStep,
    },
    errors::{RiskError, RiskResult},
};
use log::warn;

/// Ordered candidate values for one step of one record.
#[derive(Debug, Clone, PartialEq)]
pub struct GuessSet {
    variable: String,
    values: Vec<f64>,
    true_index: usize,
    levels: Option<Vec<String>>,
    substituted: bool,
}

impl GuessSet {
    /// Build a guess set, substituting the true value if it is absent.
    ///
    /// # Errors
    /// - [`RiskError::MissingTrueValue`] when `values` is empty.
    /// - [`RiskError::DuplicateTrueValue`] when the true value occurs more
    ///   than once.
    pub fn new(
        variable: impl Into<String>, mut values: Vec<f64>, true_value: f64,
        levels: Option<Vec<String>>,
    ) -> RiskResult<GuessSet> {
        let variable = variable.into();
        let mut substituted = false;
        if !values.contains(&true_value) {
            if let Some(pos) = nearest_to_median(&values) {
                values[pos] = true_value;
                substituted = true;
            }
        }

        let count = values.iter().filter(|v| **v == true_value).count();
        match count {
            0 => Err(RiskError::MissingTrueValue { variable, value: true_value }),
            1 => {
                let true_index = values.iter().position(|v| *v == true_value).unwrap_or(0);
                Ok(GuessSet { variable, values, true_index, levels, substituted })
            }
            count => Err(RiskError::DuplicateTrueValue { variable, value: true_value, count }),
        }
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Position of the true value (0-based).
    pub fn true_index(&self) -> usize {
        self.true_index
    }

    pub fn true_value(&self) -> f64 {
        self.values[self.true_index]
    }

    /// Level labels of a categorical outcome, when declared.
    pub fn levels(&self) -> Option<&[String]> {
        self.levels.as_deref()
    }

    /// Whether the true value replaced a generated guess.
    pub fn was_substituted(&self) -> bool {
        self.substituted
    }

    /// Display label of every guess: the level label for declared
    /// categorical outcomes, the formatted value otherwise.
    pub fn labels(&self) -> Vec<String> {
        self.values
            .iter()
            .map(|&v| match &self.levels {
                Some(levels) if v >= 0.0 => {
                    levels.get(v as usize).cloned().unwrap_or_else(|| v.to_string())
                }
                _ => v.to_string(),
            })
            .collect()
    }
}

/// `n` evenly spaced points from `low` to `high`; a single point is `low`.
pub fn evenly_spaced(low: f64, high: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![low],
        _ => {
            let step = (high - low) / (n - 1) as f64;
            let mut out: Vec<f64> = (0..n).map(|i| low + i as f64 * step).collect();
            out[n - 1] = high;
            out
        }
    }
}

/// Median of `values`; `None` when empty.
fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 1 { sorted[mid] } else { 0.5 * (sorted[mid - 1] + sorted[mid]) })
}

/// Index of the element nearest the median (earliest on ties).
fn nearest_to_median(values: &[f64]) -> Option<usize> {
    let m = median(values)?;
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        let d = (v - m).abs();
        if best.is_none_or(|(_, bd)| d < bd) {
            best = Some((i, d));
        }
    }
    best.map(|(i, _)| i)
}

/// Drop repeated values, keeping the first occurrence of each.
///
/// A degenerate range (a true value of 0 under percent bounds, zero-width
/// additive bounds) collapses to a single guess instead of repeating it.
fn collapse_repeats(values: Vec<f64>) -> Vec<f64> {
    let mut out: Vec<f64> = Vec::with_capacity(values.len());
    for v in values {
        if !out.contains(&v) {
            out.push(v);
        }
    }
    out
}

/// Categorical guesses precomputed for one step.
#[derive(Debug, Clone)]
struct LevelGuesses {
    values: Vec<f64>,
    labels: Option<Vec<String>>,
}

/// GuessGridBuilder — per-record guess construction for every synthesis step.
///
/// Purpose
/// -------
/// Resolve, once per batch, which steps are categorical and what their level
/// guesses are; then build the [`GuessSet`] of every step for any record.
///
/// Notes
/// -----
/// - A step is categorical if the caller flagged it or its outcome column in
///   the confidential dataset declares levels.
/// - Level guesses do not depend on the record and are shared across
///   records.
#[derive(Debug)]
pub struct GuessGridBuilder<'a> {
    confidential: &'a Dataset,
    steps: &'a [SynthesisStep],
    options: &'a RiskOptions,
    levels: Vec<Option<LevelGuesses>>,
}

impl<'a> GuessGridBuilder<'a> {
    /// Prepare a builder for `steps` over `confidential`.
    ///
    /// # Errors
    /// - [`RiskError::UnknownColumn`] when a step variable is missing from
    ///   the confidential dataset.
    pub fn new(
        confidential: &'a Dataset, steps: &'a [SynthesisStep], options: &'a RiskOptions,
    ) -> RiskResult<GuessGridBuilder<'a>> {
        let mut levels = Vec::with_capacity(steps.len());
        for step in steps {
            let column = confidential.column(step.variable())?;
            let guesses = if let Some(labels) = column.levels() {
                Some(LevelGuesses {
                    values: (0..labels.len()).map(|c| c as f64).collect(),
                    labels: Some(labels.to_vec()),
                })
            } else if step.is_categorical() {
                let mut values = column.values().to_vec();
                values.sort_by(f64::total_cmp);
                values.dedup();
                Some(LevelGuesses { values, labels: None })
            } else {
                None
            };
            levels.push(guesses);
        }
        Ok(GuessGridBuilder { confidential, steps, options, levels })
    }

    /// Whether step `step` is treated as categorical.
    pub fn is_categorical(&self, step: usize) -> bool {
        self.levels.get(step).is_some_and(Option::is_some)
    }

    /// Guess sets of every step for confidential record `record`.
    ///
    /// # Errors
    /// - [`RiskError::RecordOutOfRange`] for an invalid record index.
    /// - Any error of [`GuessGridBuilder::build_step`].
    pub fn build(&self, record: usize) -> RiskResult<Vec<GuessSet>> {
        if record >= self.confidential.n_rows() {
            return Err(RiskError::RecordOutOfRange {
                index: record,
                len: self.confidential.n_rows(),
            });
        }
        let row = self.confidential.row(record)?;
        let mut out = Vec::with_capacity(self.steps.len());
        for (j, step) in self.steps.iter().enumerate() {
            let col = self
                .confidential
                .column_index(step.variable())
                .ok_or_else(|| RiskError::UnknownColumn { column: step.variable().to_string() })?;
            let set = self.build_step(j, row[col])?;
            if set.was_substituted() {
                warn!(
                    "record {record}: true value {} of '{}' was not among its guesses; \
                     replaced the guess nearest the median",
                    row[col],
                    step.variable()
                );
            }
            out.push(set);
        }
        Ok(out)
    }

    /// Guess set of step `step` for a record whose true value is `true_value`.
    ///
    /// # Errors
    /// - [`RiskError::InvalidConfiguration`] when a per-step setting is
    ///   missing for `step`.
    /// - See [`GuessSet::new`].
    pub fn build_step(&self, step: usize, true_value: f64) -> RiskResult<GuessSet> {
        let synthesis = self
            .steps
            .get(step)
            .ok_or_else(|| RiskError::config(format!("no synthesis step at position {step}")))?;
        let variable = synthesis.variable();

        if let Some(Some(level)) = self.levels.get(step) {
            return GuessSet::new(variable, level.values.clone(), true_value, level.labels.clone());
        }

        let count = *self.options.guess_counts.get(step).ok_or_else(|| {
            RiskError::config(format!("no guess count supplied for step {step} ('{variable}')"))
        })?;
        let missing_bounds = || {
            RiskError::config(format!("no guess bounds supplied for step {step} ('{variable}')"))
        };

        let mut values = match &self.options.guess_range {
            GuessRange::Explicit(lists) => lists
                .get(step)
                .and_then(Option::as_ref)
                .cloned()
                .ok_or_else(|| {
                    RiskError::config(format!(
                        "no explicit guesses supplied for continuous step {step} ('{variable}')"
                    ))
                })?,
            GuessRange::Percent(bounds) => {
                let &(low, high) = bounds.get(step).ok_or_else(missing_bounds)?;
                let (a, b) = (true_value * (1.0 - low), true_value * (1.0 + high));
                evenly_spaced(a.min(b), a.max(b), count)
            }
            GuessRange::Additive(bounds) => {
                let &(low, high) = bounds.get(step).ok_or_else(missing_bounds)?;
                evenly_spaced(true_value - low, true_value + high, count)
            }
            GuessRange::Absolute(bounds) => {
                let &(low, high) = bounds.get(step).ok_or_else(missing_bounds)?;
                evenly_spaced(low, high, count)
            }
        };

        if synthesis.family() == Family::Poisson {
            values = values.into_iter().map(f64::round).collect();
        }

        GuessSet::new(variable, collapse_repeats(values), true_value, None)
    }
}
