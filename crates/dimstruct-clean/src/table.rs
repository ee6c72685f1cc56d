//! Column-oriented numeric table keyed by row identifier and column name
//!
//! [`NumericTable`] is the value every cleaning stage consumes and produces.
//! Stages never mutate their input: each one builds a new table from the
//! columns it keeps, so stages can be composed, reordered or re-run freely.
//!
//! # Naming convention
//!
//! Column names follow `<task>.<metric>[.<suffix>]`. The part before the
//! first dot identifies the task a column belongs to (see [`task_prefix`]).
//!
//! # Missing values
//!
//! Cells are `Option<f64>`; `None` is the missing-value marker.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::error::DataShapeError;

/// Tokens read as a missing value when parsing a cell.
const MISSING_TOKENS: &[&str] = &["", "NA", "NaN", "nan", "NAN", "null", "NULL", "None"];

/// Returns the task a column belongs to: everything before the first dot.
///
/// ```
/// use dimstruct_clean::table::task_prefix;
///
/// assert_eq!(task_prefix("stroop.incongruent_rt.logTr"), "stroop");
/// assert_eq!(task_prefix("demographics"), "demographics");
/// ```
#[must_use]
pub fn task_prefix(name: &str) -> &str {
    name.split_once('.').map_or(name, |(task, _)| task)
}

/// Parses a single cell of a text table.
///
/// Missing-value tokens (empty, `NA`, `NaN`, ...) become `None`. Infinite
/// values are rejected.
///
/// ```
/// use dimstruct_clean::table::parse_cell;
///
/// assert_eq!(parse_cell("stroop.acc", "s001", " 0.95 ").unwrap(), Some(0.95));
/// assert_eq!(parse_cell("stroop.acc", "s001", "NA").unwrap(), None);
/// assert!(parse_cell("stroop.acc", "s001", "high").is_err());
/// assert!(parse_cell("stroop.acc", "s001", "-inf").is_err());
/// ```
pub fn parse_cell(column: &str, row: &str, raw: &str) -> Result<Option<f64>, DataShapeError> {
    let trimmed = raw.trim();
    if MISSING_TOKENS.contains(&trimmed) {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_nan() => Ok(None),
        Ok(value) if value.is_infinite() => Err(DataShapeError::NonFinite {
            column: column.to_owned(),
            row: row.to_owned(),
            value: raw.to_owned(),
        }),
        Ok(value) => Ok(Some(value)),
        Err(_) => Err(DataShapeError::NonNumeric {
            column: column.to_owned(),
            row: row.to_owned(),
            value: raw.to_owned(),
        }),
    }
}

/// A named column of optional values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    name: String,
    values: Vec<Option<f64>>,
}

impl Column {
    #[must_use]
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Builds a column with no missing values.
    #[must_use]
    pub fn from_values(name: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
        Self::new(name, values.into_iter().map(Some).collect())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// The task this column belongs to.
    #[must_use]
    pub fn task(&self) -> &str {
        task_prefix(&self.name)
    }

    /// Iterates over observed values, skipping missing ones.
    pub fn observed(&self) -> impl Iterator<Item = f64> + '_ {
        dimstruct_stats::observed(&self.values)
    }

    /// Number of observed (non-missing) values.
    #[must_use]
    pub fn observed_count(&self) -> usize {
        self.observed().count()
    }

    /// Smallest observed value, if any.
    #[must_use]
    pub fn min(&self) -> Option<f64> {
        self.observed().min_by(f64::total_cmp)
    }

    /// Largest observed value, if any.
    #[must_use]
    pub fn max(&self) -> Option<f64> {
        self.observed().max_by(f64::total_cmp)
    }

    /// Returns a copy of this column with `f` applied to every observed value.
    #[must_use]
    pub fn map_observed<F>(&self, mut f: F) -> Self
    where
        F: FnMut(f64) -> f64,
    {
        Self {
            name: self.name.clone(),
            values: self.values.iter().map(|v| v.map(&mut f)).collect(),
        }
    }

    /// Returns this column under a new name.
    #[must_use]
    pub fn renamed(self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: self.values,
        }
    }
}

/// A rectangular table of numeric columns sharing one row index.
///
/// Invariants, checked by [`NumericTable::new`]:
///
/// - row identifiers are unique
/// - column names are unique
/// - every column has exactly one value per row
/// - every observed value is finite
///
/// # Examples
///
/// ```
/// use dimstruct_clean::table::{Column, NumericTable};
///
/// let table = NumericTable::new(
///     vec!["s1".into(), "s2".into()],
///     vec![
///         Column::new("stroop.rt", vec![Some(510.0), None]),
///         Column::from_values("adaptive_n_back.mean_load", [2.0, 3.5]),
///     ],
/// )
/// .unwrap();
///
/// assert_eq!(table.n_rows(), 2);
/// assert_eq!(table.column("stroop.rt").unwrap().observed_count(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericTable {
    index: Vec<String>,
    columns: Vec<Column>,
}

impl NumericTable {
    pub fn new(index: Vec<String>, columns: Vec<Column>) -> Result<Self, DataShapeError> {
        let mut seen_rows = HashSet::with_capacity(index.len());
        for id in &index {
            if !seen_rows.insert(id.as_str()) {
                return Err(DataShapeError::DuplicateRow { id: id.clone() });
            }
        }
        let mut seen_columns = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen_columns.insert(column.name()) {
                return Err(DataShapeError::DuplicateColumn {
                    name: column.name.clone(),
                });
            }
            if column.values.len() != index.len() {
                return Err(DataShapeError::ColumnLength {
                    name: column.name.clone(),
                    len: column.values.len(),
                    rows: index.len(),
                });
            }
            let non_finite = column
                .values
                .iter()
                .zip(&index)
                .find_map(|(v, row)| v.filter(|x| !x.is_finite()).map(|x| (row, x)));
            if let Some((row, value)) = non_finite {
                return Err(DataShapeError::NonFinite {
                    column: column.name.clone(),
                    row: row.clone(),
                    value: value.to_string(),
                });
            }
        }
        Ok(Self { index, columns })
    }

    /// Builds a table over the same row index with a different set of columns.
    pub fn with_columns(&self, columns: Vec<Column>) -> Result<Self, DataShapeError> {
        Self::new(self.index.clone(), columns)
    }

    /// Same row index, new columns; names and lengths are the caller's responsibility.
    pub(crate) fn replace_columns(&self, columns: Vec<Column>) -> Self {
        debug_assert!(columns.iter().all(|c| c.values.len() == self.index.len()));
        Self {
            index: self.index.clone(),
            columns,
        }
    }

    /// Row identifiers, in row order.
    #[must_use]
    pub fn index(&self) -> &[String] {
        &self.index
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns the value at (`row`, `column`); `None` if missing or absent.
    #[must_use]
    pub fn get(&self, row: &str, column: &str) -> Option<f64> {
        let row = self.index.iter().position(|id| id == row)?;
        self.column(column)?.values[row]
    }

    /// Keeps the columns for which `keep` returns `true`, in their current order.
    #[must_use]
    pub fn retain_columns<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&Column) -> bool,
    {
        Self {
            index: self.index.clone(),
            columns: self.columns.iter().filter(|c| keep(c)).cloned().collect(),
        }
    }

    /// Reorders columns by name. Row order is left untouched.
    #[must_use]
    pub fn sorted_by_name(mut self) -> Self {
        self.columns.sort_by(|a, b| a.name.cmp(&b.name));
        self
    }

    /// Groups column positions by task prefix.
    ///
    /// Tasks are ordered by name; positions within a task keep the table's
    /// column order.
    #[must_use]
    pub fn task_groups(&self) -> BTreeMap<&str, Vec<usize>> {
        let mut groups = BTreeMap::<&str, Vec<usize>>::new();
        for (position, column) in self.columns.iter().enumerate() {
            groups.entry(column.task()).or_default().push(position);
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("s{i}")).collect()
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let err = NumericTable::new(
            index(1),
            vec![
                Column::from_values("a.x", [1.0]),
                Column::from_values("a.x", [2.0]),
            ],
        )
        .unwrap_err();
        assert_eq!(
            err,
            DataShapeError::DuplicateColumn {
                name: "a.x".to_owned()
            }
        );
    }

    #[test]
    fn test_duplicate_row_rejected() {
        let err = NumericTable::new(vec!["s".into(), "s".into()], vec![]).unwrap_err();
        assert!(matches!(err, DataShapeError::DuplicateRow { .. }));
    }

    #[test]
    fn test_column_length_checked() {
        let err =
            NumericTable::new(index(3), vec![Column::from_values("a.x", [1.0, 2.0])]).unwrap_err();
        assert!(matches!(err, DataShapeError::ColumnLength { len: 2, rows: 3, .. }));
    }

    #[test]
    fn test_infinite_cell_rejected() {
        assert_eq!(
            parse_cell("a.x", "s0", "inf"),
            Err(DataShapeError::NonFinite {
                column: "a.x".to_owned(),
                row: "s0".to_owned(),
                value: "inf".to_owned(),
            })
        );
        assert!(parse_cell("a.x", "s0", "-Infinity").is_err());
        assert_eq!(parse_cell("a.x", "s0", "NaN"), Ok(None));
    }

    #[test]
    fn test_non_finite_value_rejected() {
        for value in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let err = NumericTable::new(
                index(3),
                vec![Column::new("a.x", vec![Some(1.0), None, Some(value)])],
            )
            .unwrap_err();
            assert!(
                matches!(&err, DataShapeError::NonFinite { column, row, .. } if column == "a.x" && row == "s2"),
                "{err:?}"
            );
        }
    }

    #[test]
    fn test_sorting_keeps_rows() {
        let table = NumericTable::new(
            index(2),
            vec![
                Column::from_values("b.y", [1.0, 2.0]),
                Column::from_values("a.x", [3.0, 4.0]),
            ],
        )
        .unwrap()
        .sorted_by_name();
        assert_eq!(table.column_names().collect::<Vec<_>>(), ["a.x", "b.y"]);
        assert_eq!(table.index(), index(2).as_slice());
        assert_eq!(table.get("s1", "a.x"), Some(4.0));
    }

    #[test]
    fn test_task_groups_use_exact_prefix() {
        let table = NumericTable::new(
            index(1),
            vec![
                Column::from_values("stroop.rt", [1.0]),
                Column::from_values("stroop_extra.rt", [1.0]),
                Column::from_values("stroop.acc", [1.0]),
            ],
        )
        .unwrap();
        let groups = table.task_groups();
        assert_eq!(groups["stroop"], [0, 2]);
        assert_eq!(groups["stroop_extra"], [1]);
    }
}
