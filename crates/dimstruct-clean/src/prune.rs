//! Greedy within-task correlation pruning
//!
//! Columns are grouped by task prefix. Inside a group, the first column is
//! the first anchor: every later column whose correlation magnitude with it
//! reaches the threshold is removed. The next surviving column becomes the
//! anchor, and so on until every survivor has been an anchor.
//!
//! The result depends on column order. The first of two highly correlated
//! columns, in table order, is the one kept.

use serde::Serialize;

use dimstruct_stats::correlation::CorrelationMatrix;

use crate::{
    error::{CleanError, ConfigurationError},
    patterns::PatternSet,
    select::VariableSelector,
    table::NumericTable,
};

pub const DEFAULT_CORRELATION_THRESHOLD: f64 = 0.85;

/// Removals made inside one task group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskPrune {
    pub task: String,
    pub kept: Vec<String>,
    pub removed: Vec<String>,
}

/// Outcome of one [`CorrelationPruner::prune`] run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PruneReport {
    pub threshold: f64,
    /// Every removed column, in table order.
    pub removed: Vec<String>,
    /// Groups in which at least one column was removed.
    pub groups: Vec<TaskPrune>,
}

impl PruneReport {
    /// Removes the columns recorded here from another table.
    #[must_use]
    pub fn apply(&self, table: &NumericTable) -> NumericTable {
        table.retain_columns(|column| !self.removed.iter().any(|r| r == column.name()))
    }
}

/// Returns the positions (into `matrix`) that survive greedy pruning.
///
/// `matrix` must have a zero diagonal. An undefined correlation never
/// removes a column.
fn greedy_keep(matrix: &CorrelationMatrix, threshold: f64) -> Vec<usize> {
    let mut kept = (0..matrix.size()).collect::<Vec<_>>();
    let mut i = 0;
    while i < kept.len() {
        let anchor = kept[i];
        kept.retain(|&j| matrix.get(j, anchor).is_none_or(|r| r.abs() < threshold));
        i += 1;
    }
    kept
}

/// Removes columns that are redundant with an earlier column of the same task.
///
/// # Examples
///
/// ```
/// use dimstruct_clean::{prune::CorrelationPruner, table::{Column, NumericTable}};
///
/// let index = (0..5).map(|i| format!("s{i}")).collect();
/// let table = NumericTable::new(
///     index,
///     vec![
///         Column::from_values("stroop.rt", [1.0, 2.0, 3.0, 4.0, 5.0]),
///         Column::from_values("stroop.rt_copy", [1.1, 2.0, 3.1, 4.0, 5.1]),
///         Column::from_values("simon.rt", [1.0, 2.0, 3.0, 4.0, 5.0]),
///     ],
/// )
/// .unwrap();
///
/// let (pruned, report) = CorrelationPruner::default().prune(&table).unwrap();
/// assert_eq!(report.removed, ["stroop.rt_copy"]);
/// assert!(pruned.column("simon.rt").is_some());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelationPruner {
    threshold: f64,
    verbose: bool,
}

impl Default for CorrelationPruner {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_CORRELATION_THRESHOLD,
            verbose: false,
        }
    }
}

impl CorrelationPruner {
    pub fn new(threshold: f64) -> Result<Self, ConfigurationError> {
        if threshold.is_nan() || threshold <= 0.0 || threshold > 1.0 {
            return Err(ConfigurationError::CorrelationThresholdOutOfRange { value: threshold });
        }
        Ok(Self {
            threshold,
            verbose: false,
        })
    }

    #[must_use]
    pub fn verbose(self, verbose: bool) -> Self {
        Self { verbose, ..self }
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Finds the columns to remove without removing them.
    #[must_use]
    pub fn plan(&self, table: &NumericTable) -> PruneReport {
        let mut report = PruneReport {
            threshold: self.threshold,
            ..PruneReport::default()
        };
        let columns = table.columns();
        for (task, positions) in table.task_groups() {
            if positions.len() < 2 {
                continue;
            }
            let values = positions
                .iter()
                .map(|&p| columns[p].values())
                .collect::<Vec<_>>();
            let matrix = CorrelationMatrix::from_columns(&values).with_zero_diagonal();
            let survivors = greedy_keep(&matrix, self.threshold);

            let mut group = TaskPrune {
                task: task.to_owned(),
                kept: vec![],
                removed: vec![],
            };
            for (local, &position) in positions.iter().enumerate() {
                let name = columns[position].name().to_owned();
                if survivors.contains(&local) {
                    group.kept.push(name);
                } else {
                    group.removed.push(name);
                }
            }
            if !group.removed.is_empty() {
                report.groups.push(group);
            }
        }
        report.removed = table
            .column_names()
            .filter(|name| {
                report
                    .groups
                    .iter()
                    .any(|g| g.removed.iter().any(|r| r.as_str() == *name))
            })
            .map(str::to_owned)
            .collect();
        report
    }

    /// Prunes every task group of `table`.
    ///
    /// When nothing is marked for removal the table is returned unchanged.
    pub fn prune(&self, table: &NumericTable) -> Result<(NumericTable, PruneReport), CleanError> {
        let report = self.plan(table);
        if self.verbose {
            log::info!(
                "dropping {} variables with correlations above {}: {}",
                report.removed.len(),
                self.threshold,
                report.removed.join(", ")
            );
        }
        if report.removed.is_empty() {
            return Ok((table.clone(), report));
        }
        let selector = VariableSelector::new(PatternSet::exact(&report.removed)?, PatternSet::empty());
        let (pruned, _) = selector.select(table)?;
        Ok((pruned, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn table(columns: Vec<Column>) -> NumericTable {
        let rows = columns.first().map_or(0, |c| c.values().len());
        let index = (0..rows).map(|i| format!("s{i}")).collect();
        NumericTable::new(index, columns).unwrap()
    }

    #[test]
    fn test_threshold_range() {
        assert!(CorrelationPruner::new(0.0).is_err());
        assert!(CorrelationPruner::new(1.5).is_err());
        assert!(CorrelationPruner::new(f64::NAN).is_err());
        assert!(CorrelationPruner::new(1.0).is_ok());
    }

    #[test]
    fn test_first_of_correlated_pair_survives() {
        let t = table(vec![
            Column::from_values("taskA.y", [1.0, 2.0, 3.0, 4.0, 5.0]),
            Column::from_values("taskA.x", [1.0, 2.1, 2.9, 4.0, 5.0]),
        ]);
        let (pruned, report) = CorrelationPruner::default().prune(&t).unwrap();
        assert_eq!(report.removed, ["taskA.x"]);
        assert_eq!(pruned.column_names().collect::<Vec<_>>(), ["taskA.y"]);
    }

    #[test]
    fn test_anchor_chain() {
        // a ~ b, b ~ c, but a and c are weakly related: a removes b, then c
        // is tested against a only and survives.
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let b = [1.0, 2.0, 3.0, 4.0, 8.0, 7.0, 6.0, 5.0];
        let c = [1.0, 2.0, 3.0, 4.0, 9.0, 7.0, 5.0, 3.0];
        let (a, b, c) = (a.map(Some), b.map(Some), c.map(Some));
        let matrix =
            CorrelationMatrix::from_columns(&[a.as_slice(), b.as_slice(), c.as_slice()])
                .with_zero_diagonal();
        let ab = matrix.get(0, 1).unwrap();
        let ac = matrix.get(0, 2).unwrap();
        let bc = matrix.get(1, 2).unwrap();
        let threshold = (ab.abs().min(bc.abs()) + ac.abs()) / 2.0;
        assert!(ac.abs() < threshold && ab.abs() >= threshold && bc.abs() >= threshold);
        assert_eq!(greedy_keep(&matrix, threshold), [0, 2]);
    }

    #[test]
    fn test_groups_are_independent() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let t = table(vec![
            Column::from_values("a.x", x),
            Column::from_values("b.x", x),
        ]);
        let (pruned, report) = CorrelationPruner::default().prune(&t).unwrap();
        assert!(report.removed.is_empty());
        assert_eq!(pruned, t);
    }

    #[test]
    fn test_undefined_correlation_keeps_column() {
        let t = table(vec![
            Column::from_values("a.x", [1.0, 2.0, 3.0, 4.0]),
            Column::from_values("a.constant", [2.0, 2.0, 2.0, 2.0]),
        ]);
        let report = CorrelationPruner::default().plan(&t);
        assert!(report.removed.is_empty());
    }

    #[test]
    fn test_anticorrelation_counts() {
        let t = table(vec![
            Column::from_values("a.x", [1.0, 2.0, 3.0, 4.0]),
            Column::from_values("a.reversed", [4.0, 3.0, 2.0, 1.0]),
        ]);
        let report = CorrelationPruner::default().plan(&t);
        assert_eq!(report.removed, ["a.reversed"]);
        assert_eq!(report.groups[0].kept, ["a.x"]);
    }
}
