//! Quantile-band outlier trimming
//!
//! For every column, a band is derived from its quartiles:
//!
//! ```text
//! lower = median - k * (Q3 - Q1)
//! upper = median + k * (Q3 - Q1)
//! ```
//!
//! and every value strictly outside the band is replaced by the missing
//! marker. The band is recomputed on each call from the column as it is at
//! that moment, so trimming a freshly transformed column reflects the
//! transformed values.
//!
//! # Degenerate columns
//!
//! - Zero IQR: the band collapses onto the median and every off-median value
//!   becomes missing.
//! - Fewer than [`MIN_OBSERVED_VALUES`] observed values: the column is left
//!   untouched and reported as [`InsufficientData`], or rejected when the
//!   trimmer is strict.

use serde::Serialize;

use dimstruct_stats::quantiles::Quantiles;

use crate::{
    error::{ConfigurationError, InsufficientData},
    table::{Column, NumericTable},
};

pub const DEFAULT_QUANTILE_MULTIPLIER: f64 = 2.5;

/// Columns with fewer observed values than this have no meaningful quartiles.
pub const MIN_OBSERVED_VALUES: usize = 3;

/// Quartiles of a column, computed over its observed values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuantileBand {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
}

impl QuantileBand {
    /// Computes the band of a column; `None` if the column has no observed value.
    #[must_use]
    pub fn from_values(values: &[Option<f64>]) -> Option<Self> {
        let quantiles = Quantiles::new(values.iter().copied(), &[0.25, 0.5, 0.75]);
        if quantiles.count() == 0 {
            return None;
        }
        Some(Self {
            q1: quantiles.get(0.25)?,
            median: quantiles.get(0.5)?,
            q3: quantiles.get(0.75)?,
        })
    }

    #[must_use]
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    #[must_use]
    pub fn lower(&self, multiplier: f64) -> f64 {
        self.median - multiplier * self.iqr()
    }

    #[must_use]
    pub fn upper(&self, multiplier: f64) -> f64 {
        self.median + multiplier * self.iqr()
    }

    /// Whether `value` lies inside the band (bounds included).
    #[must_use]
    pub fn contains(&self, value: f64, multiplier: f64) -> bool {
        !(value < self.lower(multiplier) || value > self.upper(multiplier))
    }
}

/// Per-column outcome of a trimming pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnTrim {
    pub column: String,
    /// Band used for this column; `None` if the column was skipped.
    pub band: Option<QuantileBand>,
    /// Number of values replaced by the missing marker.
    pub trimmed: usize,
}

/// Outcome of trimming a whole table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrimReport {
    pub columns: Vec<ColumnTrim>,
    /// Columns left untouched for lack of observed values.
    pub insufficient: Vec<InsufficientData>,
}

impl TrimReport {
    /// Total number of values replaced by the missing marker.
    #[must_use]
    pub fn total_trimmed(&self) -> usize {
        self.columns.iter().map(|c| c.trimmed).sum()
    }
}

/// Replaces values outside a per-column quantile band with missing markers.
///
/// # Examples
///
/// ```
/// use dimstruct_clean::{outlier::OutlierTrimmer, table::{Column, NumericTable}};
///
/// let index = (0..6).map(|i| format!("s{i}")).collect();
/// let table = NumericTable::new(
///     index,
///     vec![Column::from_values("task.x", [1.0, 2.0, 3.0, 4.0, 5.0, 100.0])],
/// )
/// .unwrap();
///
/// let (trimmed, report) = OutlierTrimmer::default().trim(&table).unwrap();
/// assert_eq!(trimmed.get("s5", "task.x"), None);
/// assert_eq!(trimmed.get("s4", "task.x"), Some(5.0));
/// assert_eq!(report.total_trimmed(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierTrimmer {
    multiplier: f64,
    strict: bool,
}

impl Default for OutlierTrimmer {
    fn default() -> Self {
        Self {
            multiplier: DEFAULT_QUANTILE_MULTIPLIER,
            strict: false,
        }
    }
}

impl OutlierTrimmer {
    pub fn new(multiplier: f64) -> Result<Self, ConfigurationError> {
        if multiplier.is_nan() || multiplier <= 0.0 {
            return Err(ConfigurationError::NonPositiveMultiplier { value: multiplier });
        }
        Ok(Self {
            multiplier,
            strict: false,
        })
    }

    /// In strict mode, a column with too few observed values is an error
    /// instead of a reported skip.
    #[must_use]
    pub fn strict(self, strict: bool) -> Self {
        Self { strict, ..self }
    }

    #[must_use]
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Trims every column of `table`, returning a new table of identical shape.
    pub fn trim(&self, table: &NumericTable) -> Result<(NumericTable, TrimReport), InsufficientData> {
        let mut report = TrimReport::default();
        let mut columns = Vec::with_capacity(table.n_columns());
        for column in table.columns() {
            let (trimmed, outcome) = self.trim_column(column)?;
            if outcome.band.is_none() {
                report.insufficient.push(InsufficientData {
                    column: column.name().to_owned(),
                    observed: column.observed_count(),
                    required: MIN_OBSERVED_VALUES,
                });
            }
            columns.push(trimmed);
            report.columns.push(outcome);
        }
        for skipped in &report.insufficient {
            log::warn!("outlier trimming skipped: {skipped}");
        }
        Ok((table.replace_columns(columns), report))
    }

    /// Trims a single column.
    ///
    /// A column with fewer than [`MIN_OBSERVED_VALUES`] observed values is
    /// returned unchanged with no band, unless the trimmer is strict.
    pub fn trim_column(&self, column: &Column) -> Result<(Column, ColumnTrim), InsufficientData> {
        let observed = column.observed_count();
        let band = if observed < MIN_OBSERVED_VALUES {
            None
        } else {
            QuantileBand::from_values(column.values())
        };
        let Some(band) = band else {
            if self.strict {
                return Err(InsufficientData {
                    column: column.name().to_owned(),
                    observed,
                    required: MIN_OBSERVED_VALUES,
                });
            }
            let outcome = ColumnTrim {
                column: column.name().to_owned(),
                band: None,
                trimmed: 0,
            };
            return Ok((column.clone(), outcome));
        };

        let mut trimmed = 0;
        let values = column
            .values()
            .iter()
            .map(|v| match v {
                Some(x) if !band.contains(*x, self.multiplier) => {
                    trimmed += 1;
                    None
                }
                other => *other,
            })
            .collect();
        let outcome = ColumnTrim {
            column: column.name().to_owned(),
            band: Some(band),
            trimmed,
        };
        Ok((Column::new(column.name(), values), outcome))
    }

    /// Repeats [`trim`](Self::trim) until a pass removes nothing.
    ///
    /// A single pass can shift the quartiles enough to expose values that
    /// were inside the previous band; the result of this method is a fixed
    /// point of `trim`.
    pub fn trim_until_stable(
        &self,
        table: &NumericTable,
    ) -> Result<(NumericTable, TrimReport), InsufficientData> {
        let (mut current, mut report) = self.trim(table)?;
        let mut last_pass = report.total_trimmed();
        while last_pass > 0 {
            let (next, pass) = self.trim(&current)?;
            last_pass = pass.total_trimmed();
            for (total, step) in report.columns.iter_mut().zip(&pass.columns) {
                total.trimmed += step.trimmed;
                total.band = step.band;
            }
            report.insufficient = pass.insufficient;
            current = next;
        }
        Ok((current, report))
    }
}
