//! Skew correction with a transform-or-drop policy
//!
//! Columns whose sample skewness exceeds the threshold are log-transformed:
//!
//! - **Positive skew** (`skew > threshold`): `ln(x + shift)` with
//!   `shift = max(0, 1 - min)`, so the smallest transformed input is at least 1.
//!   Survivors are renamed with the [`POSITIVE_SUFFIX`] tag.
//! - **Negative skew** (`skew < -threshold`): reflected first,
//!   `ln(max + 1 - x)`. Survivors are renamed with the [`NEGATIVE_SUFFIX`] tag.
//!
//! A transform succeeds when the transformed column, after outlier trimming,
//! has `|skew| < threshold`. The trimmed values are only used for that test;
//! the output carries the untrimmed transformed values. A column whose
//! transform fails is dropped entirely rather than reverted.
//!
//! Columns in neither class pass through unchanged. The output is sorted by
//! column name.

use std::collections::HashSet;

use serde::Serialize;

use dimstruct_stats::descriptive;

use crate::{
    error::{CleanError, ConfigurationError, DataShapeError, InsufficientData},
    outlier::{MIN_OBSERVED_VALUES, OutlierTrimmer},
    table::{Column, NumericTable},
};

pub const DEFAULT_SKEW_THRESHOLD: f64 = 1.0;

/// Name tag of columns that survived a positive-skew log transform.
pub const POSITIVE_SUFFIX: &str = ".logTr";

/// Name tag of columns that survived a negative-skew reflected log transform.
pub const NEGATIVE_SUFFIX: &str = ".ReflogTr";

/// Direction in which a column's skewness exceeds the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkewDirection {
    Positive,
    Negative,
    Unskewed,
}

impl SkewDirection {
    /// Classifies a skewness value with strict comparisons on the signed value.
    ///
    /// An undefined (NaN) skewness is never classified as skewed.
    ///
    /// ```
    /// use dimstruct_clean::skew::SkewDirection;
    ///
    /// assert_eq!(SkewDirection::classify(1.5, 1.0), SkewDirection::Positive);
    /// assert_eq!(SkewDirection::classify(-1.5, 1.0), SkewDirection::Negative);
    /// assert_eq!(SkewDirection::classify(1.0, 1.0), SkewDirection::Unskewed);
    /// assert_eq!(SkewDirection::classify(f64::NAN, 1.0), SkewDirection::Unskewed);
    /// ```
    #[must_use]
    pub fn classify(skewness: f64, threshold: f64) -> Self {
        if skewness > threshold {
            Self::Positive
        } else if skewness < -threshold {
            Self::Negative
        } else {
            Self::Unskewed
        }
    }
}

/// Partition of a table's columns into skew classes.
///
/// Each list keeps the table's column order; a column belongs to exactly one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SkewClassification {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
    pub untouched: Vec<String>,
}

impl SkewClassification {
    #[must_use]
    pub fn direction_of(&self, column: &str) -> Option<SkewDirection> {
        let contains = |names: &[String]| names.iter().any(|n| n == column);
        if contains(&self.positive) {
            Some(SkewDirection::Positive)
        } else if contains(&self.negative) {
            Some(SkewDirection::Negative)
        } else if contains(&self.untouched) {
            Some(SkewDirection::Unskewed)
        } else {
            None
        }
    }
}

/// Outcome of transforming one skew class.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransformOutcome {
    /// Original names of the columns whose transform succeeded.
    pub transformed: Vec<String>,
    /// Original names of the columns dropped after a failed transform,
    /// with the skewness measured after trimming.
    pub dropped: Vec<(String, f64)>,
}

/// Decisions taken by one [`SkewCorrector::correct`] run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SkewReport {
    pub classification: SkewClassification,
    pub positive: TransformOutcome,
    pub negative: TransformOutcome,
    /// Columns whose skewness could not be computed.
    pub insufficient: Vec<InsufficientData>,
}

impl SkewReport {
    /// Replays these decisions on another table without measuring skewness.
    ///
    /// Columns transformed here are transformed again, with the shift or
    /// reflection taken from `table`'s own values. Untouched columns are kept.
    /// Every other column is dropped. A kept column missing from `table` is an
    /// error.
    pub fn apply(&self, table: &NumericTable) -> Result<NumericTable, DataShapeError> {
        let lookup = |name: &str| {
            table
                .column(name)
                .ok_or_else(|| DataShapeError::UnknownColumn {
                    name: name.to_owned(),
                })
        };
        let mut columns = vec![];
        for name in &self.classification.untouched {
            columns.push(lookup(name)?.clone());
        }
        for name in &self.positive.transformed {
            let column = log_transform(lookup(name)?);
            columns.push(column.renamed(format!("{name}{POSITIVE_SUFFIX}")));
        }
        for name in &self.negative.transformed {
            let column = reflected_log_transform(lookup(name)?);
            columns.push(column.renamed(format!("{name}{NEGATIVE_SUFFIX}")));
        }
        Ok(table.with_columns(columns)?.sorted_by_name())
    }

    fn log(&self) {
        log::info!(
            "successfully transformed {} positively skewed variables: {}",
            self.positive.transformed.len(),
            self.positive.transformed.join(", ")
        );
        log::info!(
            "dropping {} positively skewed variables that could not be transformed: {}",
            self.positive.dropped.len(),
            dropped_names(&self.positive.dropped)
        );
        log::info!(
            "successfully transformed {} negatively skewed variables: {}",
            self.negative.transformed.len(),
            self.negative.transformed.join(", ")
        );
        log::info!(
            "dropping {} negatively skewed variables that could not be transformed: {}",
            self.negative.dropped.len(),
            dropped_names(&self.negative.dropped)
        );
    }
}

fn log_transform(column: &Column) -> Column {
    let shift = column.min().map_or(0.0, |min| (1.0 - min).max(0.0));
    column.map_observed(|x| (x + shift).ln())
}

fn reflected_log_transform(column: &Column) -> Column {
    let max = column.max().unwrap_or(0.0);
    column.map_observed(|x| (max + 1.0 - x).ln())
}

fn dropped_names(dropped: &[(String, f64)]) -> String {
    dropped
        .iter()
        .map(|(name, skew)| format!("{name} (skew {skew:.3})"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Classifies, transforms and validates skewed columns.
///
/// A surviving column is renamed with its suffix tag. If the table already
/// holds a column under that name, [`correct`](Self::correct) fails with
/// [`DataShapeError::DuplicateColumn`].
///
/// # Examples
///
/// ```
/// use dimstruct_clean::{skew::SkewCorrector, table::{Column, NumericTable}};
///
/// let index = (0..6).map(|i| format!("s{i}")).collect();
/// let table = NumericTable::new(
///     index,
///     vec![
///         Column::from_values("task.rt", [1.0, 1.0, 1.0, 1.0, 1.0, 50.0]),
///         Column::from_values("task.acc", [0.2, 0.4, 0.5, 0.6, 0.7, 0.9]),
///     ],
/// )
/// .unwrap();
///
/// let (corrected, report) = SkewCorrector::default().correct(&table).unwrap();
/// let names = corrected.column_names().collect::<Vec<_>>();
/// assert_eq!(names, ["task.acc", "task.rt.logTr"]);
/// assert_eq!(report.positive.transformed, ["task.rt"]);
/// ```
#[derive(Debug, Clone)]
pub struct SkewCorrector {
    threshold: f64,
    trimmer: OutlierTrimmer,
    positive_override: Option<Vec<String>>,
    negative_override: Option<Vec<String>>,
    verbose: bool,
}

impl Default for SkewCorrector {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SKEW_THRESHOLD,
            trimmer: OutlierTrimmer::default(),
            positive_override: None,
            negative_override: None,
            verbose: false,
        }
    }
}

impl SkewCorrector {
    pub fn new(threshold: f64) -> Result<Self, ConfigurationError> {
        if threshold.is_nan() || threshold <= 0.0 {
            return Err(ConfigurationError::NonPositiveSkewThreshold { value: threshold });
        }
        Ok(Self {
            threshold,
            ..Self::default()
        })
    }

    /// Uses `trimmer` to evaluate transformed columns; its strictness also
    /// governs columns whose skewness cannot be computed.
    #[must_use]
    pub fn with_trimmer(self, trimmer: OutlierTrimmer) -> Self {
        Self { trimmer, ..self }
    }

    /// Replaces the computed classification of either class by an explicit
    /// list of column names.
    ///
    /// A class left as `None` is still computed from the data, excluding any
    /// column explicitly placed in the other class.
    pub fn with_override(
        self,
        positive: Option<Vec<String>>,
        negative: Option<Vec<String>>,
    ) -> Result<Self, ConfigurationError> {
        if let (Some(positive), Some(negative)) = (&positive, &negative) {
            let positive = positive.iter().collect::<HashSet<_>>();
            if let Some(column) = negative.iter().find(|n| positive.contains(n)) {
                return Err(ConfigurationError::OverlappingSkewOverride {
                    column: column.clone(),
                });
            }
        }
        Ok(Self {
            positive_override: positive,
            negative_override: negative,
            ..self
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

    /// Splits the columns of `table` into positive, negative and untouched sets.
    ///
    /// Columns with fewer than three observed values have no skewness and
    /// are reported as insufficient (an error in strict mode).
    pub fn classify(
        &self,
        table: &NumericTable,
    ) -> Result<(SkewClassification, Vec<InsufficientData>), CleanError> {
        for name in self
            .positive_override
            .iter()
            .chain(&self.negative_override)
            .flatten()
        {
            if table.column(name).is_none() {
                return Err(DataShapeError::UnknownColumn { name: name.clone() }.into());
            }
        }

        let in_override = |list: &Option<Vec<String>>, name: &str| {
            list.as_ref()
                .map(|names| names.iter().any(|n| n == name))
        };

        let mut classification = SkewClassification::default();
        let mut insufficient = vec![];
        for column in table.columns() {
            let name = column.name();
            let observed = column.observed().collect::<Vec<_>>();
            let skewness = descriptive::skewness(&observed);
            if observed.len() < MIN_OBSERVED_VALUES {
                let finding = InsufficientData {
                    column: name.to_owned(),
                    observed: observed.len(),
                    required: MIN_OBSERVED_VALUES,
                };
                if self.trimmer.is_strict() {
                    return Err(finding.into());
                }
                insufficient.push(finding);
            } else if skewness.is_nan() {
                log::debug!("skewness of '{name}' overflowed; leaving it unskewed");
            }
            let computed = SkewDirection::classify(skewness, self.threshold);

            let positive = in_override(&self.positive_override, name).unwrap_or_else(|| {
                computed == SkewDirection::Positive
                    && in_override(&self.negative_override, name) != Some(true)
            });
            let negative = !positive
                && in_override(&self.negative_override, name).unwrap_or_else(|| {
                    computed == SkewDirection::Negative
                        && in_override(&self.positive_override, name) != Some(true)
                });

            let target = if positive {
                &mut classification.positive
            } else if negative {
                &mut classification.negative
            } else {
                &mut classification.untouched
            };
            target.push(name.to_owned());
        }
        Ok((classification, insufficient))
    }

    /// Runs the full correction and returns the new table sorted by column name.
    pub fn correct(&self, table: &NumericTable) -> Result<(NumericTable, SkewReport), CleanError> {
        let (classification, insufficient) = self.classify(table)?;
        for finding in &insufficient {
            log::warn!("skewness undefined: {finding}");
        }

        let pick = |names: &[String]| {
            names
                .iter()
                .filter_map(|name| table.column(name))
                .collect::<Vec<_>>()
        };

        let positive_columns = pick(&classification.positive)
            .into_iter()
            .map(log_transform)
            .collect();
        let (positive_kept, positive) = self.validate(positive_columns, POSITIVE_SUFFIX)?;

        let negative_columns = pick(&classification.negative)
            .into_iter()
            .map(reflected_log_transform)
            .collect();
        let (negative_kept, negative) = self.validate(negative_columns, NEGATIVE_SUFFIX)?;

        let mut columns = pick(&classification.untouched)
            .into_iter()
            .cloned()
            .collect::<Vec<_>>();
        columns.extend(positive_kept);
        columns.extend(negative_kept);
        let corrected = table.with_columns(columns)?.sorted_by_name();

        let report = SkewReport {
            classification,
            positive,
            negative,
            insufficient,
        };
        if self.verbose {
            report.log();
        }
        Ok((corrected, report))
    }

    /// Keeps the transformed columns whose trimmed skewness is below the threshold.
    fn validate(
        &self,
        transformed: Vec<Column>,
        suffix: &str,
    ) -> Result<(Vec<Column>, TransformOutcome), InsufficientData> {
        let mut kept = vec![];
        let mut outcome = TransformOutcome::default();
        for column in transformed {
            let (trimmed, _) = self.trimmer.trim_column(&column)?;
            let skewness = descriptive::skewness(&trimmed.observed().collect::<Vec<_>>());
            if skewness.abs() < self.threshold {
                outcome.transformed.push(column.name().to_owned());
                let name = format!("{}{suffix}", column.name());
                kept.push(column.renamed(name));
            } else {
                outcome.dropped.push((column.name().to_owned(), skewness));
            }
        }
        Ok((kept, outcome))
    }
}
