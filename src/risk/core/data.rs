//! Tabular data containers for confidential and synthetic datasets.
//!
//! Purpose
//! -------
//! Provide small, validated containers for the confidential dataset and the
//! synthetic replicates consumed by the risk estimators. This module
//! centralizes input validation for raw columns and standardizes how
//! categorical variables are represented.
//!
//! Key behaviors
//! -------------
//! - [`Column`] carries a named vector of `f64` values, optionally with
//!   declared level labels marking it as categorical (values are then
//!   0-based level codes).
//! - [`Dataset`] enforces basic invariants (non-empty, equal column lengths,
//!   unique names, finite values, valid level codes) and exposes row and
//!   column lookups by name.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every column of a dataset has the same, strictly positive length.
//! - Numeric values are finite.
//! - Categorical values are whole numbers in `0..levels.len()`.
//!
//! Conventions
//! -----------
//! - Indexing is 0-based. Rows are materialized as `Vec<f64>` in column
//!   order, so `row[dataset.column_index(name)]` is the value of `name`.
//! - Categorical levels created from labels are sorted lexicographically,
//!   so level codes are reproducible across datasets built from the same
//!   label set.
//!
//! Downstream usage
//! ----------------
//! - Construct one [`Dataset`] for the confidential data and one per
//!   synthetic replicate at the boundary where data enters the crate.
//! - Design transforms and guess construction rely on these invariants and
//!   do not re-validate basic properties.
//!
//! Testing notes
//! -------------
//! - Unit tests cover construction (happy path, empty input, length
//!   mismatch, duplicate names, non-finite values, invalid codes), label
//!   encoding, and row materialization.
use crate::risk::errors::{RiskError, RiskResult};
use ndarray::Array1;

/// `Column` — a named vector of observations, numeric or categorical.
///
/// Fields
/// ------
/// - `name`: `String`
///   Column identifier, unique within a [`Dataset`].
/// - `values`: `Array1<f64>`
///   Observations; level codes for categorical columns.
/// - `levels`: `Option<Vec<String>>`
///   Declared level labels for categorical columns; `None` for numeric.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: Array1<f64>,
    levels: Option<Vec<String>>,
}

impl Column {
    /// Numeric column. Finiteness is checked by [`Dataset::new`].
    pub fn numeric(name: impl Into<String>, values: Array1<f64>) -> Column {
        Column { name: name.into(), values, levels: None }
    }

    /// Categorical column from 0-based level codes and declared labels.
    ///
    /// # Errors
    /// - [`RiskError::InvalidConfiguration`] if `levels` is empty.
    /// - [`RiskError::InvalidCategoryCode`] if a code is `>= levels.len()`.
    pub fn categorical(
        name: impl Into<String>, codes: &[usize], levels: Vec<String>,
    ) -> RiskResult<Column> {
        let name = name.into();
        if levels.is_empty() {
            return Err(RiskError::config(format!(
                "categorical column '{name}' must declare at least one level"
            )));
        }
        if let Some((index, &code)) = codes.iter().enumerate().find(|(_, c)| **c >= levels.len())
        {
            return Err(RiskError::InvalidCategoryCode { column: name, index, value: code as f64 });
        }
        let values = codes.iter().map(|&c| c as f64).collect();
        Ok(Column { name, values, levels: Some(levels) })
    }

    /// Categorical column from raw labels; levels are the sorted distinct labels.
    pub fn from_labels<S: AsRef<str>>(name: impl Into<String>, labels: &[S]) -> RiskResult<Column> {
        let mut levels: Vec<String> = labels.iter().map(|l| l.as_ref().to_string()).collect();
        levels.sort();
        levels.dedup();
        let codes: Vec<usize> = labels
            .iter()
            .map(|l| levels.binary_search_by(|lv| lv.as_str().cmp(l.as_ref())).unwrap_or(0))
            .collect();
        Column::categorical(name, &codes, levels)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    /// Declared level labels, if categorical.
    pub fn levels(&self) -> Option<&[String]> {
        self.levels.as_deref()
    }

    pub fn is_categorical(&self) -> bool {
        self.levels.is_some()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// `Dataset` — validated, column-oriented table of records.
///
/// Purpose
/// -------
/// Represent either the confidential dataset or one synthetic replicate.
/// Rows are records; columns are attributes.
///
/// Invariants
/// ----------
/// - At least one column and one row.
/// - All columns have length `n_rows`.
/// - Column names are unique.
/// - Numeric values are finite; categorical values are valid level codes.
///
/// Performance
/// -----------
/// - Validation is O(rows × columns), performed once at construction.
/// - Name lookups are linear in the number of columns, which is small for
///   the tables this crate targets.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Dataset {
    /// Construct a validated [`Dataset`].
    ///
    /// Errors
    /// ------
    /// - `RiskError::EmptyDataset` when there are no columns or no rows.
    /// - `RiskError::ColumnLengthMismatch` when a column differs in length
    ///   from the first column.
    /// - `RiskError::DuplicateColumn` when two columns share a name.
    /// - `RiskError::NonFiniteData` for NaN/±∞ values (first offender).
    /// - `RiskError::InvalidCategoryCode` for codes that are not whole
    ///   numbers in range.
    pub fn new(columns: Vec<Column>) -> RiskResult<Dataset> {
        let n_rows = match columns.first() {
            Some(first) if !first.is_empty() => first.len(),
            _ => return Err(RiskError::EmptyDataset),
        };

        for (pos, column) in columns.iter().enumerate() {
            if column.len() != n_rows {
                return Err(RiskError::ColumnLengthMismatch {
                    column: column.name.clone(),
                    expected: n_rows,
                    actual: column.len(),
                });
            }
            if columns[..pos].iter().any(|c| c.name == column.name) {
                return Err(RiskError::DuplicateColumn { column: column.name.clone() });
            }
            for (index, &value) in column.values.iter().enumerate() {
                if !value.is_finite() {
                    return Err(RiskError::NonFiniteData {
                        column: column.name.clone(),
                        index,
                        value,
                    });
                }
                if let Some(levels) = &column.levels {
                    if value < 0.0 || value.fract() != 0.0 || value as usize >= levels.len() {
                        return Err(RiskError::InvalidCategoryCode {
                            column: column.name.clone(),
                            index,
                            value,
                        });
                    }
                }
            }
        }

        Ok(Dataset { columns, n_rows })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Position of `name` in column order.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Column by name.
    ///
    /// # Errors
    /// [`RiskError::UnknownColumn`] if `name` is not present.
    pub fn column(&self, name: &str) -> RiskResult<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| RiskError::UnknownColumn { column: name.to_string() })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Materialize record `index` in column order.
    ///
    /// # Errors
    /// [`RiskError::RecordOutOfRange`] if `index >= n_rows`.
    pub fn row(&self, index: usize) -> RiskResult<Vec<f64>> {
        if index >= self.n_rows {
            return Err(RiskError::RecordOutOfRange { index, len: self.n_rows });
        }
        Ok(self.columns.iter().map(|c| c.values[index]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - `Dataset::new` happy path and every validation branch.
    // - Categorical construction from codes and from labels.
    // - Row materialization and name lookups.
    //
    // They intentionally DO NOT cover:
    // - How datasets feed design rows or guesses; see `design` / `guesses`.
    // -------------------------------------------------------------------------

    fn sample() -> Dataset {
        Dataset::new(vec![
            Column::numeric("income", array![10.0, 20.0, 30.0]),
            Column::categorical("sex", &[0, 1, 1], vec!["F".into(), "M".into()]).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Verify the happy path and lookups.
    //
    // Given
    // -----
    // - A numeric and a categorical column of length 3.
    //
    // Expect
    // ------
    // - Shape (3, 2), name lookups by position, and rows in column order.
    fn dataset_new_accepts_valid_columns() {
        let ds = sample();
        assert_eq!(ds.n_rows(), 3);
        assert_eq!(ds.n_cols(), 2);
        assert_eq!(ds.column_index("sex"), Some(1));
        assert_eq!(ds.column_index("age"), None);
        assert_eq!(ds.row(2).unwrap(), vec![30.0, 1.0]);
        assert!(ds.column("sex").unwrap().is_categorical());
        assert_eq!(ds.names().collect::<Vec<_>>(), vec!["income", "sex"]);
    }

    #[test]
    // Purpose
    // -------
    // Verify the structural validation branches of `Dataset::new`.
    //
    // Given
    // -----
    // - No columns, a zero-length column, mismatched lengths, and a
    //   duplicate name.
    //
    // Expect
    // ------
    // - `EmptyDataset`, `EmptyDataset`, `ColumnLengthMismatch`,
    //   `DuplicateColumn`.
    fn dataset_new_rejects_malformed_tables() {
        assert_eq!(Dataset::new(vec![]), Err(RiskError::EmptyDataset));
        assert_eq!(
            Dataset::new(vec![Column::numeric("a", Array1::zeros(0))]),
            Err(RiskError::EmptyDataset)
        );
        assert_eq!(
            Dataset::new(vec![
                Column::numeric("a", array![1.0]),
                Column::numeric("b", array![1.0, 2.0]),
            ]),
            Err(RiskError::ColumnLengthMismatch { column: "b".into(), expected: 1, actual: 2 })
        );
        assert_eq!(
            Dataset::new(vec![
                Column::numeric("a", array![1.0]),
                Column::numeric("a", array![2.0]),
            ]),
            Err(RiskError::DuplicateColumn { column: "a".into() })
        );
    }

    #[test]
    // Purpose
    // -------
    // Verify value-level validation.
    //
    // Given
    // -----
    // - A NaN in a numeric column and an out-of-range categorical code.
    //
    // Expect
    // ------
    // - `NonFiniteData` and `InvalidCategoryCode` with the offending index.
    fn dataset_and_column_reject_invalid_values() {
        let err = Dataset::new(vec![Column::numeric("a", array![1.0, f64::NAN])]).unwrap_err();
        assert!(matches!(err, RiskError::NonFiniteData { index: 1, .. }));

        let err = Column::categorical("c", &[0, 2], vec!["x".into(), "y".into()]).unwrap_err();
        assert_eq!(
            err,
            RiskError::InvalidCategoryCode { column: "c".into(), index: 1, value: 2.0 }
        );

        assert!(matches!(
            Column::categorical("c", &[0], vec![]),
            Err(RiskError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Verify label encoding in `Column::from_labels`.
    //
    // Given
    // -----
    // - Labels ["b", "a", "c", "a"].
    //
    // Expect
    // ------
    // - Sorted levels [a, b, c] and codes [1, 0, 2, 0].
    fn from_labels_sorts_levels_and_encodes_codes() {
        let col = Column::from_labels("x", &["b", "a", "c", "a"]).unwrap();
        assert_eq!(col.levels().unwrap(), &["a".to_string(), "b".to_string(), "c".to_string()]);
        assert_eq!(col.values(), &array![1.0, 0.0, 2.0, 0.0]);
    }

    #[test]
    // Purpose
    // -------
    // Verify row bounds checking.
    //
    // Given
    // -----
    // - A 3-row dataset.
    //
    // Expect
    // ------
    // - `row(3)` fails with `RecordOutOfRange`.
    fn row_out_of_range_is_reported() {
        assert_eq!(sample().row(3), Err(RiskError::RecordOutOfRange { index: 3, len: 3 }));
    }
}
