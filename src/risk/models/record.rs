//! Record risk estimator — the full guess-grid posterior of one record.
//!
//! Purpose
//! -------
//! Enumerate every guess combination of one confidential record, score each
//! with the [`ImportanceSampler`], normalize the scores into a joint
//! probability tensor, and derive the disclosure-risk summaries of that
//! record.
//!
//! Key behaviors
//! -------------
//! - Combinations are enumerated by flat index with [`MixedRadix`] (first
//!   step fastest); the guessed record is the confidential record with every
//!   step variable replaced by its guess.
//! - Unnormalized log masses are normalized with a log-domain softmax and
//!   reshaped into a [`ProbabilityTensor`] in the same order.
//! - [`RiskRecord`] exposes the tensor, per-step true-value marginals, the
//!   joint true-value probability, a rank table, and per-step absolute
//!   differences between the modal guess and the true value.
//!
//! Invariants & assumptions
//! ------------------------
//! - Tensor entries sum to one (up to rounding).
//! - Each reported marginal is `Σ` of the tensor over all other axes at the
//!   step's true index, computed from the tensor itself.
//! - The rank table is sorted by non-increasing probability; ties keep
//!   enumeration order. Ranks run `1..=N`.
//! - A record whose every combination has zero mass fails with
//!   [`RiskError::DegenerateRecord`].
//!
//! Downstream usage
//! ----------------
//! - Batch estimation builds one [`RecordRiskEstimator`] and calls
//!   [`RecordRiskEstimator::estimate`] per record; records are independent,
//!   so callers may distribute records across threads.
use crate::{
    numerical_stability::normalize_log_weights,
    risk::{
        core::{
            data::Dataset,
            guesses::{GuessGridBuilder, GuessSet},
            indexer::MixedRadix,
            options::RiskOptions,
            step::SynthesisStep,
            tensor::ProbabilityTensor,
            validation::validate_inputs,
        },
        errors::{RiskError, RiskResult},
        models::sampler::ImportanceSampler,
    },
};
use ndarray::Array1;

/// One row of a record's rank table.
#[derive(Debug, Clone, PartialEq)]
pub struct RankRow {
    /// 1-based rank by probability.
    pub rank: usize,
    /// Flat combination index (first step fastest).
    pub flat_index: usize,
    pub probability: f64,
    /// Guess value of every step.
    pub guesses: Vec<f64>,
}

/// RiskRecord — disclosure-risk estimate for one confidential record.
///
/// Fields
/// ------
/// - `record`: row index in the confidential dataset.
/// - `guesses`: per-step guess sets, axis labels of the tensor.
/// - `tensor`: normalized joint probabilities over the guess grid.
/// - `marginal_true`: per-step marginal probability of the true value.
/// - `joint_true`: probability of the all-true combination.
/// - `true_flat`: flat index of the all-true combination.
/// - `rank_table`: every combination sorted by decreasing probability.
/// - `abs_diff`: per-step `|modal guess − true value|`.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskRecord {
    record: usize,
    guesses: Vec<GuessSet>,
    tensor: ProbabilityTensor,
    marginal_true: Vec<f64>,
    joint_true: f64,
    true_flat: usize,
    rank_table: Vec<RankRow>,
    abs_diff: Vec<f64>,
}

impl RiskRecord {
    pub fn record(&self) -> usize {
        self.record
    }

    pub fn guesses(&self) -> &[GuessSet] {
        &self.guesses
    }

    pub fn tensor(&self) -> &ProbabilityTensor {
        &self.tensor
    }

    /// Per-step marginal probability of the true value.
    pub fn marginal_true(&self) -> &[f64] {
        &self.marginal_true
    }

    /// Probability of the combination of all true values.
    pub fn joint_true(&self) -> f64 {
        self.joint_true
    }

    pub fn rank_table(&self) -> &[RankRow] {
        &self.rank_table
    }

    /// Per-step absolute difference between the guess with the highest
    /// marginal probability and the true value.
    pub fn abs_diff(&self) -> &[f64] {
        &self.abs_diff
    }

    /// Per-step index of the true value within its guess set.
    pub fn true_indices(&self) -> Vec<usize> {
        self.guesses.iter().map(GuessSet::true_index).collect()
    }

    /// Flat index of the all-true combination.
    pub fn true_flat_index(&self) -> usize {
        self.true_flat
    }

    /// Rank of the all-true combination in the rank table.
    pub fn true_rank(&self) -> usize {
        self.rank_table
            .iter()
            .find(|row| row.flat_index == self.true_flat)
            .map_or(self.rank_table.len(), |row| row.rank)
    }
}

/// RecordRiskEstimator — per-record driver of guess enumeration and scoring.
///
/// Purpose
/// -------
/// Hold the per-batch state (validated inputs, guess builder, importance
/// sampler with precomputed synthetic log-likelihoods) and estimate the
/// risk of any confidential record on demand.
///
/// Performance
/// -----------
/// - One estimate costs O(Π D_j × (steps × H′ + replicates × H)).
/// - The estimator is read-only after construction.
#[derive(Debug)]
pub struct RecordRiskEstimator<'a> {
    confidential: &'a Dataset,
    builder: GuessGridBuilder<'a>,
    sampler: ImportanceSampler<'a>,
    step_columns: Vec<usize>,
}

impl<'a> RecordRiskEstimator<'a> {
    /// Validate the inputs and prepare per-batch state.
    ///
    /// # Errors
    /// - Any error of
    ///   [`validate_inputs`](crate::risk::core::validation::validate_inputs).
    /// - Density errors raised while precomputing synthetic log-likelihoods.
    pub fn new(
        confidential: &'a Dataset, synthetic: &[Dataset], steps: &'a [SynthesisStep],
        options: &'a RiskOptions,
    ) -> RiskResult<RecordRiskEstimator<'a>> {
        validate_inputs(confidential, synthetic, steps, options)?;
        let builder = GuessGridBuilder::new(confidential, steps, options)?;
        let sampler = ImportanceSampler::new(confidential, synthetic, steps, options)?;
        let step_columns = steps
            .iter()
            .map(|s| {
                confidential
                    .column_index(s.variable())
                    .ok_or_else(|| RiskError::UnknownColumn { column: s.variable().to_string() })
            })
            .collect::<RiskResult<Vec<usize>>>()?;
        Ok(RecordRiskEstimator { confidential, builder, sampler, step_columns })
    }

    pub fn n_records(&self) -> usize {
        self.confidential.n_rows()
    }

    pub fn sampler(&self) -> &ImportanceSampler<'a> {
        &self.sampler
    }

    pub fn guess_builder(&self) -> &GuessGridBuilder<'a> {
        &self.builder
    }

    /// Unnormalized log mass of every combination of `record`, in flat order,
    /// together with the record's guess sets.
    pub fn log_masses(&self, record: usize) -> RiskResult<(Vec<GuessSet>, Array1<f64>)> {
        let guesses = self.builder.build(record)?;
        let dims: Vec<usize> = guesses.iter().map(GuessSet::len).collect();
        let radix = MixedRadix::new(&dims)?;
        let true_indices: Vec<usize> = guesses.iter().map(GuessSet::true_index).collect();

        let row = self.confidential.row(record)?;
        let true_ld = self.sampler.true_log_densities(&row)?;
        let mut guessed_row = row;
        let mut out = Array1::<f64>::zeros(radix.len());
        for (flat, slot) in out.iter_mut().enumerate() {
            let indices = radix.decode(flat);
            for ((&col, set), &i) in self.step_columns.iter().zip(&guesses).zip(&indices) {
                guessed_row[col] = set.values()[i];
            }
            let is_truth = indices == true_indices;
            *slot = self.sampler.log_mass(&guessed_row, &true_ld, is_truth, radix.len())?;
        }
        Ok((guesses, out))
    }

    /// Estimate the disclosure risk of confidential record `record`.
    ///
    /// # Errors
    /// - [`RiskError::RecordOutOfRange`] for an invalid index.
    /// - [`RiskError::DegenerateRecord`] when no combination has positive
    ///   mass.
    /// - Guess-construction and density errors.
    pub fn estimate(&self, record: usize) -> RiskResult<RiskRecord> {
        let (guesses, log_mass) = self.log_masses(record)?;
        let probs =
            normalize_log_weights(log_mass.view()).ok_or(RiskError::DegenerateRecord { record })?;

        let dims: Vec<usize> = guesses.iter().map(GuessSet::len).collect();
        let radix = MixedRadix::new(&dims)?;
        let tensor = ProbabilityTensor::from_flat(probs.to_vec(), &dims)?;
        let true_indices: Vec<usize> = guesses.iter().map(GuessSet::true_index).collect();

        let mut marginal_true = Vec::with_capacity(dims.len());
        let mut abs_diff = Vec::with_capacity(dims.len());
        for (axis, set) in guesses.iter().enumerate() {
            let marginal = tensor.marginal(axis).ok_or_else(|| shape_error(axis))?;
            marginal_true.push(marginal[set.true_index()]);
            let modal = first_argmax(&marginal);
            abs_diff.push((set.values()[modal] - set.true_value()).abs());
        }
        let joint_true = tensor.get(&true_indices).ok_or_else(|| shape_error(dims.len()))?;
        let true_flat = radix.encode(&true_indices).ok_or_else(|| shape_error(dims.len()))?;

        let mut order: Vec<usize> = (0..probs.len()).collect();
        order.sort_by(|&a, &b| probs[b].total_cmp(&probs[a]));
        let rank_table = order
            .into_iter()
            .enumerate()
            .map(|(pos, flat)| RankRow {
                rank: pos + 1,
                flat_index: flat,
                probability: probs[flat],
                guesses: radix
                    .decode(flat)
                    .into_iter()
                    .zip(&guesses)
                    .map(|(i, set)| set.values()[i])
                    .collect(),
            })
            .collect();

        Ok(RiskRecord {
            record,
            guesses,
            tensor,
            marginal_true,
            joint_true,
            true_flat,
            rank_table,
            abs_diff,
        })
    }
}

fn shape_error(axis: usize) -> RiskError {
    RiskError::TensorShape { reason: format!("probability tensor has no axis {axis}") }
}

/// Index of the largest entry; the earliest wins ties.
fn first_argmax(values: &Array1<f64>) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}
