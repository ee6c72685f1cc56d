//! Pattern-driven variable selection
//!
//! A column is dropped when its name matches any drop pattern, unless it
//! also matches a saved pattern: the saved set always wins. The output is
//! sorted by column name whether or not saved patterns are given.

use std::collections::HashSet;

use serde::Serialize;

use crate::{
    error::{ConfigurationError, DataShapeError},
    patterns::PatternSet,
    table::NumericTable,
};

/// Columns removed and rescued by one [`VariableSelector::select`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionReport {
    /// Columns matching a drop pattern and no saved pattern.
    pub dropped: Vec<String>,
    /// Columns matching both a drop and a saved pattern.
    pub rescued: Vec<String>,
    /// Saved patterns that matched no column of the table.
    pub unmatched_saved: Vec<String>,
}

impl SelectionReport {
    fn log(&self) {
        log::info!(
            "dropping {} variables: {}",
            self.dropped.len(),
            self.dropped.join(", ")
        );
        if !self.rescued.is_empty() {
            log::info!(
                "keeping {} saved variables that matched a drop pattern: {}",
                self.rescued.len(),
                self.rescued.join(", ")
            );
        }
    }
}

/// Removes columns whose name matches a drop pattern.
///
/// # Examples
///
/// ```
/// use dimstruct_clean::{select::VariableSelector, table::{Column, NumericTable}};
///
/// let table = NumericTable::new(
///     vec!["s1".into()],
///     vec![
///         Column::from_values("grit_survey.total", [3.0]),
///         Column::from_values("holt_laury_survey.beta", [0.4]),
///         Column::from_values("stroop.stroop_rt", [80.0]),
///     ],
/// )
/// .unwrap();
///
/// let selector = VariableSelector::from_patterns(&["survey"], &["holt"]).unwrap();
/// let (selected, report) = selector.select(&table).unwrap();
/// assert_eq!(
///     selected.column_names().collect::<Vec<_>>(),
///     ["holt_laury_survey.beta", "stroop.stroop_rt"],
/// );
/// assert_eq!(report.dropped, ["grit_survey.total"]);
/// ```
#[derive(Debug, Clone)]
pub struct VariableSelector {
    drop: PatternSet,
    saved: PatternSet,
    strict: bool,
    verbose: bool,
}

impl VariableSelector {
    #[must_use]
    pub fn new(drop: PatternSet, saved: PatternSet) -> Self {
        Self {
            drop,
            saved,
            strict: false,
            verbose: false,
        }
    }

    /// Selector using the curated default drop set and no saved patterns.
    pub fn with_defaults() -> Result<Self, ConfigurationError> {
        Ok(Self::new(PatternSet::default_drop()?, PatternSet::empty()))
    }

    /// Compiles both pattern lists; an empty drop list means the curated defaults.
    pub fn from_patterns<D, S>(drop: &[D], saved: &[S]) -> Result<Self, ConfigurationError>
    where
        D: AsRef<str>,
        S: AsRef<str>,
    {
        let drop = if drop.is_empty() {
            PatternSet::default_drop()?
        } else {
            PatternSet::compile(drop)?
        };
        Ok(Self::new(drop, PatternSet::compile(saved)?))
    }

    /// In strict mode a saved pattern matching no column is an error.
    #[must_use]
    pub fn strict(self, strict: bool) -> Self {
        Self { strict, ..self }
    }

    #[must_use]
    pub fn verbose(self, verbose: bool) -> Self {
        Self { verbose, ..self }
    }

    #[must_use]
    pub fn drop_patterns(&self) -> &PatternSet {
        &self.drop
    }

    #[must_use]
    pub fn saved_patterns(&self) -> &PatternSet {
        &self.saved
    }

    /// Whether a column named `name` survives selection.
    #[must_use]
    pub fn keeps(&self, name: &str) -> bool {
        !self.drop.is_match(name) || self.saved.is_match(name)
    }

    pub fn select(
        &self,
        table: &NumericTable,
    ) -> Result<(NumericTable, SelectionReport), DataShapeError> {
        let mut report = SelectionReport::default();
        let mut saved_hits = HashSet::new();

        for name in table.column_names() {
            let mut saved = false;
            for pattern in self.saved.matching(name) {
                saved_hits.insert(pattern);
                saved = true;
            }
            if self.drop.is_match(name) {
                if saved {
                    report.rescued.push(name.to_owned());
                } else {
                    report.dropped.push(name.to_owned());
                }
            }
        }

        report.unmatched_saved = self
            .saved
            .patterns()
            .iter()
            .filter(|pattern| !saved_hits.contains(pattern.as_str()))
            .cloned()
            .collect();
        if let Some(pattern) = report.unmatched_saved.first() {
            if self.strict {
                return Err(DataShapeError::UnmatchedSavedPattern {
                    pattern: pattern.clone(),
                });
            }
            log::debug!(
                "saved patterns matching no column: {}",
                report.unmatched_saved.join(", ")
            );
        }

        let selected = table
            .retain_columns(|column| self.keeps(column.name()))
            .sorted_by_name();
        if self.verbose {
            report.log();
        }
        Ok((selected, report))
    }
}
