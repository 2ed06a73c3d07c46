//! Design rows — mapping a data record to the numeric predictor vector of a
//! synthesis model.
//!
//! Purpose
//! -------
//! Abstract the "predictor specification + record → numeric row" transform
//! that every synthesis step needs to form linear predictors from posterior
//! coefficient draws. The crate ships an explicit coefficient-to-column
//! mapping ([`PredictorSpec`]); callers with a richer modeling layer can
//! implement [`DesignRow`] themselves.
//!
//! Key behaviors
//! -------------
//! - [`DesignRow`] is the capability consumed by the estimators: it reports
//!   its width, the columns it reads, and evaluates one record.
//! - [`PredictorSpec`] implements it with an optional intercept followed by
//!   numeric terms and categorical indicator (dummy) terms.
//!
//! Invariants & assumptions
//! ------------------------
//! - `design_row(..).len() == width()` for every record.
//! - Column references are resolved by name against the dataset the record
//!   was taken from; the confidential and synthetic datasets may order their
//!   columns differently.
//!
//! Conventions
//! -----------
//! - The coefficient order in posterior draws matches the design order:
//!   intercept first (when present), then terms in declaration order.
//! - Indicator terms compare level codes exactly (`row[col] == code`).
use crate::risk::{
    core::data::Dataset,
    errors::{RiskError, RiskResult},
};
use ndarray::{Array1, Array2};

/// Capability: evaluate the design row of a predictor specification for
/// one record.
pub trait DesignRow: std::fmt::Debug + Send + Sync {
    /// Number of entries in every design row (coefficient count P).
    fn width(&self) -> usize;

    /// Names of the dataset columns this transform reads.
    fn columns(&self) -> Vec<&str>;

    /// Design row for `row`, a record laid out in `dataset`'s column order.
    fn design_row(&self, dataset: &Dataset, row: &[f64]) -> RiskResult<Array1<f64>>;

    /// Design matrix (`n_rows × width`) for every record of `dataset`.
    fn design_matrix(&self, dataset: &Dataset) -> RiskResult<Array2<f64>> {
        let mut out = Array2::<f64>::zeros((dataset.n_rows(), self.width()));
        for (i, mut out_row) in out.rows_mut().into_iter().enumerate() {
            out_row.assign(&self.design_row(dataset, &dataset.row(i)?)?);
        }
        Ok(out)
    }
}

/// One non-intercept term of a [`PredictorSpec`].
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// The column value itself.
    Numeric(String),
    /// `1.0` when the column equals level `code`, else `0.0`.
    Indicator { column: String, code: usize },
}

impl Term {
    fn column(&self) -> &str {
        match self {
            Term::Numeric(column) | Term::Indicator { column, .. } => column,
        }
    }
}

/// Explicit coefficient-to-column mapping for one synthesis model.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PredictorSpec {
    pub intercept: bool,
    pub terms: Vec<Term>,
}

impl PredictorSpec {
    pub fn new(intercept: bool, terms: Vec<Term>) -> PredictorSpec {
        PredictorSpec { intercept, terms }
    }

    /// Intercept-only model (width 1).
    pub fn intercept_only() -> PredictorSpec {
        PredictorSpec { intercept: true, terms: Vec::new() }
    }

    /// Append a numeric term.
    pub fn with_numeric(mut self, column: impl Into<String>) -> PredictorSpec {
        self.terms.push(Term::Numeric(column.into()));
        self
    }

    /// Append an indicator term for level `code` of a categorical column.
    pub fn with_indicator(mut self, column: impl Into<String>, code: usize) -> PredictorSpec {
        self.terms.push(Term::Indicator { column: column.into(), code });
        self
    }
}

impl DesignRow for PredictorSpec {
    fn width(&self) -> usize {
        usize::from(self.intercept) + self.terms.len()
    }

    fn columns(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::with_capacity(self.terms.len());
        for term in &self.terms {
            if !out.contains(&term.column()) {
                out.push(term.column());
            }
        }
        out
    }

    fn design_row(&self, dataset: &Dataset, row: &[f64]) -> RiskResult<Array1<f64>> {
        let mut out = Array1::<f64>::zeros(self.width());
        let offset = usize::from(self.intercept);
        if self.intercept {
            out[0] = 1.0;
        }
        for (k, term) in self.terms.iter().enumerate() {
            let col = dataset
                .column_index(term.column())
                .ok_or_else(|| RiskError::UnknownColumn { column: term.column().to_string() })?;
            out[offset + k] = match term {
                Term::Numeric(_) => row[col],
                Term::Indicator { code, .. } => f64::from(u8::from(row[col] == *code as f64)),
            };
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::core::data::Column;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Width and column reporting of `PredictorSpec`.
    // - Row evaluation with intercept, numeric, and indicator terms.
    // - Name resolution against datasets with different column orders.
    // - The default `design_matrix` implementation.
    // -------------------------------------------------------------------------

    fn dataset() -> Dataset {
        Dataset::new(vec![
            Column::numeric("age", array![30.0, 45.0]),
            Column::categorical("edu", &[2, 0], vec!["a".into(), "b".into(), "c".into()]).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Verify evaluation of a mixed specification.
    //
    // Given
    // -----
    // - intercept + age + [edu == 2] on record 0 (age 30, edu 2).
    //
    // Expect
    // ------
    // - Width 3, columns [age, edu], and row [1, 30, 1].
    fn predictor_spec_evaluates_mixed_terms() {
        let spec = PredictorSpec::intercept_only().with_numeric("age").with_indicator("edu", 2);
        let ds = dataset();
        assert_eq!(spec.width(), 3);
        assert_eq!(spec.columns(), vec!["age", "edu"]);
        let row = spec.design_row(&ds, &ds.row(0).unwrap()).unwrap();
        assert_eq!(row, array![1.0, 30.0, 1.0]);
    }

    #[test]
    // Purpose
    // -------
    // Verify name resolution against a dataset with a different column order.
    //
    // Given
    // -----
    // - The same columns in reverse order.
    //
    // Expect
    // ------
    // - Identical design rows for the same record.
    fn design_row_resolves_columns_by_name() {
        let spec = PredictorSpec::new(false, vec![Term::Numeric("age".into())]);
        let ds = dataset();
        let reversed = Dataset::new(ds.columns().iter().rev().cloned().collect()).unwrap();
        assert_eq!(
            spec.design_row(&ds, &ds.row(1).unwrap()).unwrap(),
            spec.design_row(&reversed, &reversed.row(1).unwrap()).unwrap()
        );
    }

    #[test]
    // Purpose
    // -------
    // Verify the unknown-column error and the default design matrix.
    //
    // Given
    // -----
    // - A spec referencing a missing column; an intercept + age spec.
    //
    // Expect
    // ------
    // - `UnknownColumn`, and a 2 × 2 matrix [[1, 30], [1, 45]].
    fn design_matrix_stacks_rows_and_unknown_columns_fail() {
        let ds = dataset();
        let bad = PredictorSpec::intercept_only().with_numeric("income");
        assert_eq!(
            bad.design_row(&ds, &ds.row(0).unwrap()),
            Err(RiskError::UnknownColumn { column: "income".into() })
        );

        let spec = PredictorSpec::intercept_only().with_numeric("age");
        assert_eq!(spec.design_matrix(&ds).unwrap(), array![[1.0, 30.0], [1.0, 45.0]]);
    }
}
