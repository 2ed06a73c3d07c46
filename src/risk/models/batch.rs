//! Batch risk estimation — attribute-disclosure risk for every record.
//!
//! Purpose
//! -------
//! Run the [`RecordRiskEstimator`] over every row of the confidential
//! dataset in row order, report progress to a caller-supplied sink, and
//! collect the results into a [`RiskSet`] with convenience summaries.
//!
//! Key behaviors
//! -------------
//! - [`estimate_risk`] validates inputs once, precomputes per-batch state,
//!   then estimates each record; progress is logged at debug level.
//! - [`estimate_risk_with_progress`] does the same with any [`Progress`]
//!   sink (closures `FnMut(completed, total)` qualify).
//! - [`RiskSet`] is index-aligned with the confidential rows and offers
//!   matrix views and a [`RiskSummary`].
//!
//! Invariants & assumptions
//! ------------------------
//! - A failure on any record aborts the batch and is returned unchanged;
//!   no partial result is produced.
//! - Progress is reported after each completed record with
//!   `completed ∈ 1..=total`.
//!
//! Conventions
//! -----------
//! - Records are processed sequentially. [`RecordRiskEstimator::estimate`]
//!   is public for callers that want to distribute records themselves.
//!
//! Testing notes
//! -------------
//! - Unit tests cover progress reporting, index alignment, error
//!   propagation, and the summary arithmetic; end-to-end scenarios live in
//!   the integration tests.
use crate::risk::{
    core::{data::Dataset, options::RiskOptions, step::SynthesisStep},
    errors::RiskResult,
    models::record::{RecordRiskEstimator, RiskRecord},
};
use log::{debug, info};
use ndarray::{Array1, Array2};

/// Receiver of per-record progress notifications.
pub trait Progress {
    /// Called after record `completed − 1` finished, out of `total`.
    fn record_done(&mut self, completed: usize, total: usize);
}

impl<F: FnMut(usize, usize)> Progress for F {
    fn record_done(&mut self, completed: usize, total: usize) {
        self(completed, total)
    }
}

/// Progress sink that writes debug-level log lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl Progress for LogProgress {
    fn record_done(&mut self, completed: usize, total: usize) {
        debug!("attribute risk: {completed}/{total} records estimated");
    }
}

/// Estimate attribute-disclosure risk for every confidential record.
///
/// # Arguments
/// - `confidential`: the confidential dataset; one result per row.
/// - `synthetic`: one or more synthetic replicates.
/// - `steps`: synthesis steps in synthesis order.
/// - `options`: iterations, guess policy, and prior.
///
/// # Errors
/// - Configuration errors, before any record is processed.
/// - The first per-record error, which aborts the batch.
pub fn estimate_risk(
    confidential: &Dataset, synthetic: &[Dataset], steps: &[SynthesisStep], options: &RiskOptions,
) -> RiskResult<RiskSet> {
    estimate_risk_with_progress(confidential, synthetic, steps, options, &mut LogProgress)
}

/// [`estimate_risk`] with a caller-supplied progress sink.
pub fn estimate_risk_with_progress<P: Progress + ?Sized>(
    confidential: &Dataset, synthetic: &[Dataset], steps: &[SynthesisStep], options: &RiskOptions,
    progress: &mut P,
) -> RiskResult<RiskSet> {
    let estimator = RecordRiskEstimator::new(confidential, synthetic, steps, options)?;
    let total = estimator.n_records();
    info!(
        "estimating attribute risk: {total} records, {} steps, {} synthetic replicates, {} iterations",
        steps.len(),
        synthetic.len(),
        options.iterations
    );

    let mut records = Vec::with_capacity(total);
    for record in 0..total {
        records.push(estimator.estimate(record)?);
        progress.record_done(record + 1, total);
    }

    let set = RiskSet::new(steps.iter().map(|s| s.variable().to_string()).collect(), records);
    if let Some(summary) = set.summary() {
        info!(
            "attribute risk done: mean joint true-value probability {:.4}, truth ranked first for {:.1}% of records",
            summary.mean_joint_true,
            100.0 * summary.top_ranked_share
        );
    }
    Ok(set)
}

/// RiskSet — per-record risk estimates, index-aligned with the
/// confidential rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskSet {
    variables: Vec<String>,
    records: Vec<RiskRecord>,
}

impl RiskSet {
    pub fn new(variables: Vec<String>, records: Vec<RiskRecord>) -> RiskSet {
        RiskSet { variables, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, record: usize) -> Option<&RiskRecord> {
        self.records.get(record)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RiskRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[RiskRecord] {
        &self.records
    }

    /// Synthesized variables in step order (tensor axis order).
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// `records × steps` matrix of true-value marginal probabilities.
    pub fn marginal_true_matrix(&self) -> Array2<f64> {
        let mut out = Array2::<f64>::zeros((self.len(), self.variables.len()));
        for (mut row, rec) in out.rows_mut().into_iter().zip(&self.records) {
            for (slot, &p) in row.iter_mut().zip(rec.marginal_true()) {
                *slot = p;
            }
        }
        out
    }

    /// Joint true-value probability per record.
    pub fn joint_true(&self) -> Array1<f64> {
        self.records.iter().map(RiskRecord::joint_true).collect()
    }

    /// Rank of the true combination per record.
    pub fn true_ranks(&self) -> Vec<usize> {
        self.records.iter().map(RiskRecord::true_rank).collect()
    }

    /// Averages over records; `None` for an empty set.
    pub fn summary(&self) -> Option<RiskSummary> {
        if self.is_empty() {
            return None;
        }
        let n = self.len() as f64;
        let n_steps = self.variables.len();
        let mut mean_marginal_true = vec![0.0; n_steps];
        let mut mean_abs_diff = vec![0.0; n_steps];
        for rec in &self.records {
            for (acc, &p) in mean_marginal_true.iter_mut().zip(rec.marginal_true()) {
                *acc += p / n;
            }
            for (acc, &d) in mean_abs_diff.iter_mut().zip(rec.abs_diff()) {
                *acc += d / n;
            }
        }
        let top = self.records.iter().filter(|r| r.true_rank() == 1).count();
        Some(RiskSummary {
            n_records: self.len(),
            variables: self.variables.clone(),
            mean_marginal_true,
            mean_joint_true: self.joint_true().sum() / n,
            mean_abs_diff,
            top_ranked_share: top as f64 / n,
        })
    }
}

impl<'a> IntoIterator for &'a RiskSet {
    type Item = &'a RiskRecord;
    type IntoIter = std::slice::Iter<'a, RiskRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// RiskSummary — record-averaged risk measures of a [`RiskSet`].
///
/// Fields
/// ------
/// - `n_records`: number of records averaged.
/// - `variables`: synthesized variables in step order.
/// - `mean_marginal_true`: per-step mean true-value marginal probability.
/// - `mean_joint_true`: mean joint true-value probability.
/// - `mean_abs_diff`: per-step mean absolute difference of the modal guess.
/// - `top_ranked_share`: share of records whose true combination ranks first.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskSummary {
    pub n_records: usize,
    pub variables: Vec<String>,
    pub mean_marginal_true: Vec<f64>,
    pub mean_joint_true: f64,
    pub mean_abs_diff: Vec<f64>,
    pub top_ranked_share: f64,
}
