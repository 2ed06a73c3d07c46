//! Mixed-radix indexing of guess combinations.
//!
//! A record's guess grid is the Cartesian product of its per-step guess
//! sets, with sizes `(D_1, …, D_J)`. [`MixedRadix`] maps a flat combination
//! index `c ∈ 0..Π D_j` to one guess index per step and back, with the
//! **first step varying fastest** (column-major order):
//!
//! `c = i_1 + D_1·i_2 + D_1·D_2·i_3 + …`
//!
//! The same order is used when the flat probability vector is reshaped into
//! a tensor, so flat index `c` and tensor cell `decode(c)` always agree.
use crate::risk::errors::{RiskError, RiskResult};

/// Mixed-radix number system over the dimension sizes of a guess grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixedRadix {
    dims: Vec<usize>,
    strides: Vec<usize>,
    len: usize,
}

impl MixedRadix {
    /// # Errors
    /// - [`RiskError::InvalidConfiguration`] for an empty dimension list, a
    ///   zero dimension, or a product that overflows `usize`.
    pub fn new(dims: &[usize]) -> RiskResult<MixedRadix> {
        if dims.is_empty() {
            return Err(RiskError::config("a guess grid needs at least one dimension"));
        }
        let mut strides = Vec::with_capacity(dims.len());
        let mut len: usize = 1;
        for (axis, &d) in dims.iter().enumerate() {
            if d == 0 {
                return Err(RiskError::config(format!("guess grid dimension {axis} is empty")));
            }
            strides.push(len);
            len = len.checked_mul(d).ok_or_else(|| {
                RiskError::config(format!("guess grid with dimensions {dims:?} is too large"))
            })?;
        }
        Ok(MixedRadix { dims: dims.to_vec(), strides, len })
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Number of combinations `Π D_j`.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Guess index of axis `axis` in combination `flat`.
    pub fn digit(&self, flat: usize, axis: usize) -> usize {
        (flat / self.strides[axis]) % self.dims[axis]
    }

    /// Per-step guess indices of combination `flat`.
    pub fn decode(&self, flat: usize) -> Vec<usize> {
        (0..self.dims.len()).map(|axis| self.digit(flat, axis)).collect()
    }

    /// Flat index of per-step guess indices; `None` if any index is out of
    /// range or the arity is wrong.
    pub fn encode(&self, indices: &[usize]) -> Option<usize> {
        if indices.len() != self.dims.len() {
            return None;
        }
        let mut flat = 0;
        for ((&i, &d), &s) in indices.iter().zip(&self.dims).zip(&self.strides) {
            if i >= d {
                return None;
            }
            flat += i * s;
        }
        Some(flat)
    }
}
