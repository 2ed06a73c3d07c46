//! Probability tensors over guess grids.
//!
//! A [`ProbabilityTensor`] holds the normalized posterior probability of
//! every guess combination of one record as a J-dimensional array with
//! shape `(D_1, …, D_J)`. The flat probability vector is laid out in the
//! order of [`MixedRadix`](crate::risk::core::indexer::MixedRadix), first
//! step fastest, which is exactly ndarray's Fortran (column-major) order;
//! reshaping therefore never moves data.
//!
//! Marginals are obtained by summing out every other axis.
use crate::risk::errors::{RiskError, RiskResult};
use ndarray::{Array1, ArrayD, Axis, IxDyn, ShapeBuilder};

/// Normalized probabilities over the guess grid of one record.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityTensor {
    values: ArrayD<f64>,
}

impl ProbabilityTensor {
    /// Reshape a flat, first-axis-fastest probability vector.
    ///
    /// # Errors
    /// - [`RiskError::TensorShape`] if `probs.len()` differs from `Π dims`.
    pub fn from_flat(probs: Vec<f64>, dims: &[usize]) -> RiskResult<ProbabilityTensor> {
        let expected: usize = dims.iter().product();
        if probs.len() != expected {
            return Err(RiskError::TensorShape {
                reason: format!(
                    "{} probabilities cannot fill a grid of shape {dims:?} ({expected} cells)",
                    probs.len()
                ),
            });
        }
        let values = ArrayD::from_shape_vec(IxDyn(dims).f(), probs)?;
        Ok(ProbabilityTensor { values })
    }

    pub fn shape(&self) -> &[usize] {
        self.values.shape()
    }

    pub fn ndim(&self) -> usize {
        self.values.ndim()
    }

    /// The underlying J-dimensional array.
    pub fn values(&self) -> &ArrayD<f64> {
        &self.values
    }

    /// Probability of one combination, `None` when out of range.
    pub fn get(&self, indices: &[usize]) -> Option<f64> {
        if indices.len() != self.ndim() {
            return None;
        }
        self.values.get(IxDyn(indices)).copied()
    }

    /// Total mass (1 up to rounding for a normalized tensor).
    pub fn total(&self) -> f64 {
        self.values.sum()
    }

    /// Marginal distribution of axis `axis`; `None` for an invalid axis.
    pub fn marginal(&self, axis: usize) -> Option<Array1<f64>> {
        if axis >= self.ndim() {
            return None;
        }
        Some(
            (0..self.shape()[axis])
                .map(|v| self.values.index_axis(Axis(axis), v).sum())
                .collect(),
        )
    }

    /// Marginal probability that axis `axis` takes guess `index`.
    pub fn marginal_at(&self, axis: usize, index: usize) -> Option<f64> {
        if axis >= self.ndim() || index >= self.shape()[axis] {
            return None;
        }
        Some(self.values.index_axis(Axis(axis), index).sum())
    }
}
