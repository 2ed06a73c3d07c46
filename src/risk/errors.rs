//! Errors for attribute-risk estimation (input validation, configuration
//! checks, guess construction, and density evaluation).
//!
//! This module defines the crate-wide error type, [`RiskError`], used by the
//! data containers, the density engine, guess construction, and the
//! estimators. It implements `Display`/`Error` for idiomatic `?`-based
//! propagation.
//!
//! ## Conventions
//! - **Indices are 0-based** (records, draws, categories, rows).
//! - Configuration problems ([`RiskError::InvalidConfiguration`] and the
//!   shape/column variants) are detected once, before any record is
//!   processed.
//! - A single combination that is impossible under every posterior draw is
//!   *not* an error; it receives probability zero. Only a record whose whole
//!   grid is impossible fails with [`RiskError::DegenerateRecord`].
//! - `statrs` constructor failures are normalized to crate variants.
use ndarray::ShapeError;
use statrs::distribution::NormalError;

/// Crate-wide result alias for operations that may produce [`RiskError`].
pub type RiskResult<T> = Result<T, RiskError>;

/// Unified error type for attribute-risk estimation.
#[derive(Debug, Clone, PartialEq)]
pub enum RiskError {
    // ---- Density engine ----
    /// Distribution family name is not one of the supported families.
    InvalidFamily { family: String },

    // ---- Guess construction ----
    /// The true value is absent from the guess sequence even after substitution.
    MissingTrueValue { variable: String, value: f64 },

    /// The true value appears more than once in the guess sequence.
    DuplicateTrueValue { variable: String, value: f64, count: usize },

    // ---- Configuration ----
    /// Options or cross-input checks failed.
    InvalidConfiguration { reason: String },

    // ---- Input/data validation ----
    /// Dataset has no columns or no rows.
    EmptyDataset,

    /// Column length differs from the first column of the dataset.
    ColumnLengthMismatch { column: String, expected: usize, actual: usize },

    /// Two columns share a name.
    DuplicateColumn { column: String },

    /// A referenced column is not present in a dataset.
    UnknownColumn { column: String },

    /// A data point is NaN/±inf.
    NonFiniteData { column: String, index: usize, value: f64 },

    /// A categorical code is not a whole number in `0..levels.len()`.
    InvalidCategoryCode { column: String, index: usize, value: f64 },

    // ---- Posterior draws ----
    /// Scale column entry must be finite and > 0.
    InvalidScale { draw: usize, value: f64 },

    /// Multinomial probability entry must be finite and in [0, 1].
    InvalidProbability { draw: usize, category: usize, value: f64 },

    /// Number of coefficients in the draws differs from the design width.
    DesignWidthMismatch { variable: String, expected: usize, actual: usize },

    // ---- Estimation ----
    /// Requested record index is outside the confidential dataset.
    RecordOutOfRange { index: usize, len: usize },

    /// Every guess combination of a record has zero posterior-predictive mass.
    DegenerateRecord { record: usize },

    /// Tensor construction failed (internal shape inconsistency).
    TensorShape { reason: String },

    // ---- statrs distribution errors ----
    /// Wrapper for statrs::distribution::NormalError
    InvalidNormalParam,

    /// ---- Fallback ----
    UnknownError,
}

impl std::error::Error for RiskError {}

impl std::fmt::Display for RiskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Density engine ----
            RiskError::InvalidFamily { family } => {
                write!(
                    f,
                    "Unsupported distribution family '{family}'; expected one of normal, binomial, poisson, multinomial."
                )
            }
            // ---- Guess construction ----
            RiskError::MissingTrueValue { variable, value } => {
                write!(f, "True value {value} of '{variable}' is missing from its guess sequence.")
            }
            RiskError::DuplicateTrueValue { variable, value, count } => {
                write!(
                    f,
                    "True value {value} of '{variable}' appears {count} times in its guess sequence; it must appear exactly once."
                )
            }
            // ---- Configuration ----
            RiskError::InvalidConfiguration { reason } => {
                write!(f, "Invalid configuration: {reason}")
            }
            // ---- Input/data validation ----
            RiskError::EmptyDataset => {
                write!(f, "Dataset must have at least one column and one row.")
            }
            RiskError::ColumnLengthMismatch { column, expected, actual } => {
                write!(
                    f,
                    "Column '{column}' has length {actual}; expected {expected} to match the dataset."
                )
            }
            RiskError::DuplicateColumn { column } => {
                write!(f, "Column '{column}' appears more than once.")
            }
            RiskError::UnknownColumn { column } => {
                write!(f, "Column '{column}' is not present in the dataset.")
            }
            RiskError::NonFiniteData { column, index, value } => {
                write!(f, "Value at index {index} of column '{column}' is non-finite: {value}")
            }
            RiskError::InvalidCategoryCode { column, index, value } => {
                write!(
                    f,
                    "Value at index {index} of categorical column '{column}' is not a valid level code: {value}"
                )
            }
            // ---- Posterior draws ----
            RiskError::InvalidScale { draw, value } => {
                write!(f, "Scale of posterior draw {draw} must be finite and > 0; got: {value}")
            }
            RiskError::InvalidProbability { draw, category, value } => {
                write!(
                    f,
                    "Probability of category {category} in posterior draw {draw} must be finite and in [0, 1]; got: {value}"
                )
            }
            RiskError::DesignWidthMismatch { variable, expected, actual } => {
                write!(
                    f,
                    "Posterior draws for '{variable}' have {actual} coefficients; the design row has {expected}."
                )
            }
            // ---- Estimation ----
            RiskError::RecordOutOfRange { index, len } => {
                write!(f, "Record index {index} is out of range for {len} confidential records.")
            }
            RiskError::DegenerateRecord { record } => {
                write!(
                    f,
                    "Every guess combination of record {record} has zero posterior-predictive mass."
                )
            }
            RiskError::TensorShape { reason } => {
                write!(f, "Probability tensor shape error: {reason}")
            }
            // ---- statrs distribution errors ----
            RiskError::InvalidNormalParam => {
                write!(
                    f,
                    "Normal distribution requires a finite mean and a standard deviation > 0."
                )
            }
            RiskError::UnknownError => {
                write!(f, "An unknown error occurred in the distribution.")
            }
        }
    }
}

impl From<NormalError> for RiskError {
    fn from(err: NormalError) -> RiskError {
        match err {
            NormalError::MeanInvalid | NormalError::StandardDeviationInvalid => {
                RiskError::InvalidNormalParam
            }
            #[allow(unreachable_patterns)]
            _ => RiskError::UnknownError,
        }
    }
}

impl From<ShapeError> for RiskError {
    fn from(err: ShapeError) -> RiskError {
        RiskError::TensorShape { reason: err.to_string() }
    }
}

impl RiskError {
    /// Shorthand for [`RiskError::InvalidConfiguration`].
    pub(crate) fn config(reason: impl Into<String>) -> RiskError {
        RiskError::InvalidConfiguration { reason: reason.into() }
    }
}
