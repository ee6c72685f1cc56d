//! Sampling-adequacy gates run on a cleaned table before factor analysis
//!
//! Statistical adequacy tests (Bartlett sphericity, KMO) live outside this
//! crate; they plug in by implementing [`AdequacyGate`]. The built-in
//! [`SampleSizeGate`] only checks the shape of the table.

use std::fmt;

use serde::Serialize;

use crate::table::NumericTable;

/// Result of one gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdequacyVerdict {
    pub gate: String,
    pub passed: bool,
    pub detail: String,
}

pub trait AdequacyGate: fmt::Debug + Send + Sync {
    #[must_use]
    fn name(&self) -> &str;
    #[must_use]
    fn clone_boxed(&self) -> BoxedAdequacyGate;
    #[must_use]
    fn check(&self, table: &NumericTable) -> AdequacyVerdict;
}

pub type BoxedAdequacyGate = Box<dyn AdequacyGate>;

impl Clone for BoxedAdequacyGate {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

pub const DEFAULT_MIN_ROWS: usize = 50;
pub const DEFAULT_MIN_ROWS_PER_COLUMN: f64 = 5.0;

/// Requires enough rows overall and per column, and no column without any
/// observed value.
///
/// ```
/// use dimstruct_clean::{
///     adequacy::{AdequacyGate, SampleSizeGate},
///     table::{Column, NumericTable},
/// };
///
/// let index = (0..10).map(|i| format!("s{i}")).collect();
/// let table = NumericTable::new(
///     index,
///     vec![Column::from_values("stroop.rt", (0..10).map(f64::from))],
/// )
/// .unwrap();
///
/// assert!(SampleSizeGate::new(10, 5.0).check(&table).passed);
/// assert!(!SampleSizeGate::default().check(&table).passed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleSizeGate {
    min_rows: usize,
    min_rows_per_column: f64,
}

impl Default for SampleSizeGate {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_ROWS, DEFAULT_MIN_ROWS_PER_COLUMN)
    }
}

impl SampleSizeGate {
    #[must_use]
    pub fn new(min_rows: usize, min_rows_per_column: f64) -> Self {
        Self {
            min_rows,
            min_rows_per_column,
        }
    }
}

impl AdequacyGate for SampleSizeGate {
    fn name(&self) -> &'static str {
        "sample_size"
    }

    fn clone_boxed(&self) -> BoxedAdequacyGate {
        Box::new(*self)
    }

    #[expect(clippy::cast_precision_loss)]
    fn check(&self, table: &NumericTable) -> AdequacyVerdict {
        let rows = table.n_rows();
        let columns = table.n_columns();
        let empty = table
            .columns()
            .iter()
            .filter(|c| c.observed_count() == 0)
            .map(|c| c.name())
            .collect::<Vec<_>>();

        let mut problems = vec![];
        if columns == 0 {
            problems.push("table has no columns".to_owned());
        }
        if rows < self.min_rows {
            problems.push(format!("{rows} rows, at least {} needed", self.min_rows));
        }
        if columns > 0 {
            let ratio = rows as f64 / columns as f64;
            if ratio < self.min_rows_per_column {
                problems.push(format!(
                    "{ratio:.2} rows per column, at least {} needed",
                    self.min_rows_per_column
                ));
            }
        }
        if !empty.is_empty() {
            problems.push(format!("no observed values in {}", empty.join(", ")));
        }

        let passed = problems.is_empty();
        let detail = if passed {
            format!("{rows} rows, {columns} columns")
        } else {
            problems.join("; ")
        };
        AdequacyVerdict {
            gate: self.name().to_owned(),
            passed,
            detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn table(rows: usize, columns: Vec<Vec<Option<f64>>>) -> NumericTable {
        let index = (0..rows).map(|i| format!("s{i}")).collect();
        let columns = columns
            .into_iter()
            .enumerate()
            .map(|(i, values)| Column::new(format!("t.c{i}"), values))
            .collect();
        NumericTable::new(index, columns).unwrap()
    }

    #[test]
    fn test_ratio_checked() {
        let full = vec![Some(1.0); 12];
        let t = table(12, vec![full.clone(), full.clone(), full]);
        assert!(SampleSizeGate::new(10, 4.0).check(&t).passed);
        let verdict = SampleSizeGate::new(10, 5.0).check(&t);
        assert!(!verdict.passed);
        assert!(verdict.detail.contains("rows per column"));
    }

    #[test]
    fn test_empty_column_fails() {
        let t = table(20, vec![vec![Some(1.0); 20], vec![None; 20]]);
        let verdict = SampleSizeGate::new(1, 1.0).check(&t);
        assert!(!verdict.passed);
        assert!(verdict.detail.contains("t.c1"));
    }

    #[test]
    fn test_no_columns_fails() {
        let t = table(100, vec![]);
        assert!(!SampleSizeGate::default().check(&t).passed);
    }

    #[test]
    fn test_boxed_gate_clones() {
        let gate: BoxedAdequacyGate = Box::new(SampleSizeGate::default());
        let cloned = gate.clone();
        assert_eq!(cloned.name(), "sample_size");
    }
}
