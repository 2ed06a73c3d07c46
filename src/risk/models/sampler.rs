//! Importance sampler — relative posterior-predictive mass of one guess
//! combination.
//!
//! Purpose
//! -------
//! For a fixed record and guess combination, estimate in log space how
//! plausible the combination is given the synthetic data, averaging over
//! posterior parameter uncertainty with self-normalized importance weights.
//!
//! Key behaviors
//! -------------
//! - Per draw `h` of all H′ draws, the log density ratio of the guessed
//!   record against the true record is
//!   `lr_h = Σ_l [log f(g_l | x_l(g), θ_h) − log f(t_l | x_l(t), θ_h)]`,
//!   where `x_l(g)` is step `l`'s design row with every earlier step's
//!   guess substituted.
//! - The self-normalizing constant is `log Σ_{h<H′} exp(lr_h)`; the weights
//!   of the first H draws are `log_q_h = lr_h − log Σ exp(lr)`.
//! - For each synthetic replicate `m`, the draw log-likelihood
//!   `log_p_h = Σ_l Σ_rows log f(y | x, θ_h)` is combined as
//!   `LSE_h(log_p_h + log_q_h)`, an optional prior term is added, and the
//!   per-replicate values are summed.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs have passed
//!   [`validate_inputs`](crate::risk::core::validation::validate_inputs):
//!   equal H′ across steps, `H ≤ H′`, consistent widths.
//! - `log_p_h` does not depend on the record or the guesses; it is computed
//!   once at construction and reused for every combination.
//! - A combination impossible under every draw yields `-∞`, which is not
//!   an error; it receives zero probability after normalization.
//! - When the true record is impossible under some draws (`lr_h = +∞`),
//!   the weight is shared evenly among those draws, the limit of the
//!   self-normalized weights.
//!
//! Conventions
//! -----------
//! - Draws are used in row order; "the first H draws" are rows `0..H`.
//! - The prior term is `w / (N + w − 1)` for the all-true combination and
//!   `1 / (N + w − 1)` otherwise, with `N` the number of combinations;
//!   it is added after log-sum-exp, once per replicate.
use crate::{
    numerical_stability::{log_ratio, log_sum_exp},
    risk::{
        core::{data::Dataset, options::RiskOptions, step::SynthesisStep},
        errors::{RiskError, RiskResult},
    },
};
use ndarray::{Array1, ArrayView1, Zip, s};

/// ImportanceSampler — log posterior-predictive mass of guess combinations.
///
/// Fields
/// ------
/// - `confidential`: dataset whose rows define the true records and the
///   column layout of guessed rows.
/// - `steps`: ordered synthesis steps.
/// - `iterations`: number H of draws entering the per-draw weights.
/// - `prior_weight`: optional prior influence `w > 0`.
/// - `synthetic_loglik`: per replicate, `log_p_h` for `h < H`.
///
/// Performance
/// -----------
/// - Construction costs O(replicates × steps × rows × H).
/// - [`ImportanceSampler::log_mass`] costs O(steps × H′) density
///   evaluations plus O(replicates × H) for the aggregation.
#[derive(Debug)]
pub struct ImportanceSampler<'a> {
    confidential: &'a Dataset,
    steps: &'a [SynthesisStep],
    iterations: usize,
    prior_weight: Option<f64>,
    synthetic_loglik: Vec<Array1<f64>>,
}

impl<'a> ImportanceSampler<'a> {
    /// Precompute the synthetic-data log-likelihood of every draw.
    ///
    /// # Errors
    /// - Any density or design error raised while evaluating the synthetic
    ///   replicates.
    pub fn new(
        confidential: &'a Dataset, synthetic: &[Dataset], steps: &'a [SynthesisStep],
        options: &RiskOptions,
    ) -> RiskResult<ImportanceSampler<'a>> {
        let iterations = options.iterations;
        let mut synthetic_loglik = Vec::with_capacity(synthetic.len());
        for replicate in synthetic {
            let mut total = Array1::<f64>::zeros(iterations);
            for step in steps {
                total += &step.log_likelihood(replicate, iterations)?;
            }
            synthetic_loglik.push(total);
        }
        Ok(ImportanceSampler {
            confidential,
            steps,
            iterations,
            prior_weight: options.prior_weight,
            synthetic_loglik,
        })
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn n_replicates(&self) -> usize {
        self.synthetic_loglik.len()
    }

    /// `log_p_h` of every replicate (one vector of length H per replicate).
    pub fn synthetic_log_likelihood(&self) -> &[Array1<f64>] {
        &self.synthetic_loglik
    }

    /// Per-step log densities of the true record under all H′ draws.
    ///
    /// `row` is the confidential record in dataset column order.
    pub fn true_log_densities(&self, row: &[f64]) -> RiskResult<Vec<Array1<f64>>> {
        self.step_log_densities(row)
    }

    /// Self-normalized log importance weights `log_q_h`, `h < H`, of the
    /// guessed record `guessed_row`.
    ///
    /// `true_ld` is the output of [`ImportanceSampler::true_log_densities`]
    /// for the same record.
    pub fn log_weights(
        &self, guessed_row: &[f64], true_ld: &[Array1<f64>],
    ) -> RiskResult<Array1<f64>> {
        let guessed_ld = self.step_log_densities(guessed_row)?;
        let n_draws = guessed_ld.first().map_or(0, Array1::len);

        let mut lr = Array1::<f64>::zeros(n_draws);
        for (g, t) in guessed_ld.iter().zip(true_ld) {
            Zip::from(&mut lr).and(g).and(t).for_each(|acc, &num, &den| {
                *acc += log_ratio(num, den);
            });
        }

        let log_denom = log_sum_exp(lr.view());
        let head = lr.slice(s![..self.iterations.min(n_draws)]);
        if log_denom == f64::INFINITY {
            let k = lr.iter().filter(|v| **v == f64::INFINITY).count() as f64;
            return Ok(head.mapv(|v| if v == f64::INFINITY { -k.ln() } else { f64::NEG_INFINITY }));
        }
        Ok(head.mapv(|v| log_ratio(v, log_denom)))
    }

    /// Additive prior term for a combination among `n_combinations`;
    /// `0` when no prior weight is configured.
    pub fn prior_term(&self, is_truth: bool, n_combinations: usize) -> f64 {
        match self.prior_weight {
            Some(w) => {
                let denom = n_combinations as f64 + w - 1.0;
                if is_truth { w / denom } else { 1.0 / denom }
            }
            None => 0.0,
        }
    }

    /// `LSE_h(log_p_h + log_q_h)` for replicate `replicate`, plus `prior`.
    pub fn replicate_log_mass(
        &self, replicate: usize, log_q: ArrayView1<'_, f64>, prior: f64,
    ) -> f64 {
        let log_p = &self.synthetic_loglik[replicate];
        let combined = &log_p.slice(s![..log_q.len()]) + &log_q;
        log_sum_exp(combined.view()) + prior
    }

    /// Unnormalized log mass of one combination, summed over replicates.
    ///
    /// # Arguments
    /// - `guessed_row`: the confidential record with every step variable
    ///   replaced by its guess.
    /// - `true_ld`: per-step true log densities of the same record.
    /// - `is_truth`: whether every guess equals the true value.
    /// - `n_combinations`: size of the record's guess grid.
    pub fn log_mass(
        &self, guessed_row: &[f64], true_ld: &[Array1<f64>], is_truth: bool, n_combinations: usize,
    ) -> RiskResult<f64> {
        let log_q = self.log_weights(guessed_row, true_ld)?;
        let prior = self.prior_term(is_truth, n_combinations);
        Ok((0..self.n_replicates()).map(|m| self.replicate_log_mass(m, log_q.view(), prior)).sum())
    }

    fn step_log_densities(&self, row: &[f64]) -> RiskResult<Vec<Array1<f64>>> {
        let mut out = Vec::with_capacity(self.steps.len());
        for step in self.steps {
            let idx = self
                .confidential
                .column_index(step.variable())
                .ok_or_else(|| RiskError::UnknownColumn { column: step.variable().to_string() })?;
            out.push(step.log_densities(row[idx], self.confidential, row, step.draws().n_draws())?);
        }
        Ok(out)
    }
}
