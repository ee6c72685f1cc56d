//! Bundle passed from the cleaning pipeline to factor and cluster analysis

use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigurationError, DataShapeError},
    table::NumericTable,
};

pub const DEFAULT_BOOT_ITER: usize = 1000;

/// Distance between variables used by hierarchical clustering.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// `1 - |r|`
    #[default]
    AbsCorrelation,
    /// `1 - r`
    Correlation,
    Euclidean,
}

impl DistanceMetric {
    pub const ALL: [Self; 3] = [Self::AbsCorrelation, Self::Correlation, Self::Euclidean];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AbsCorrelation => "abscorrelation",
            Self::Correlation => "correlation",
            Self::Euclidean => "euclidean",
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceMetric {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|metric| metric.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigurationError::UnknownDistanceMetric { name: s.to_owned() })
    }
}

/// Identifier tagging the outputs of one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub u16);

impl RunId {
    /// A fresh random 16-bit identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(rand::random())
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cleaned data plus the analysis parameters that travel with it.
///
/// ```
/// use dimstruct_clean::{
///     handoff::{DistanceMetric, EfaHandoff, RunId},
///     table::{Column, NumericTable},
/// };
///
/// let table = NumericTable::new(vec!["s1".into()], vec![Column::from_values("a.x", [1.0])]).unwrap();
/// let handoff = EfaHandoff::new(table).run_id(RunId(4242));
/// assert_eq!(handoff.dist_metric, DistanceMetric::AbsCorrelation);
/// assert_eq!(handoff.boot_iter, 1000);
/// assert_eq!(handoff.run_id.to_string(), "4242");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EfaHandoff {
    /// Cleaned table, normally built from imputed data.
    pub data: NumericTable,
    /// The same subjects cleaned without imputation.
    pub data_no_impute: Option<NumericTable>,
    pub dist_metric: DistanceMetric,
    pub boot_iter: usize,
    pub run_id: RunId,
}

impl EfaHandoff {
    #[must_use]
    pub fn new(data: NumericTable) -> Self {
        Self {
            data,
            data_no_impute: None,
            dist_metric: DistanceMetric::default(),
            boot_iter: DEFAULT_BOOT_ITER,
            run_id: RunId::random(),
        }
    }

    /// Attaches the non-imputed variant; both tables must share the row index
    /// and the column names.
    pub fn with_unimputed(self, data_no_impute: NumericTable) -> Result<Self, DataShapeError> {
        if data_no_impute.index() != self.data.index() {
            return Err(DataShapeError::RowMismatch);
        }
        let names = |table: &NumericTable| {
            table
                .column_names()
                .map(str::to_owned)
                .collect::<BTreeSet<_>>()
        };
        let (imputed, unimputed) = (names(&self.data), names(&data_no_impute));
        if let Some(name) = imputed.symmetric_difference(&unimputed).next() {
            return Err(DataShapeError::ColumnMismatch { name: name.clone() });
        }
        Ok(Self {
            data_no_impute: Some(data_no_impute),
            ..self
        })
    }

    #[must_use]
    pub fn dist_metric(self, dist_metric: DistanceMetric) -> Self {
        Self {
            dist_metric,
            ..self
        }
    }

    #[must_use]
    pub fn boot_iter(self, boot_iter: usize) -> Self {
        Self { boot_iter, ..self }
    }

    #[must_use]
    pub fn run_id(self, run_id: RunId) -> Self {
        Self { run_id, ..self }
    }

    /// Summary of the bundle without the data.
    #[must_use]
    pub fn manifest(&self) -> HandoffManifest {
        HandoffManifest {
            run_id: self.run_id,
            dist_metric: self.dist_metric,
            boot_iter: self.boot_iter,
            n_rows: self.data.n_rows(),
            columns: self.data.column_names().map(str::to_owned).collect(),
            unimputed_columns: self
                .data_no_impute
                .as_ref()
                .map(|t| t.column_names().map(str::to_owned).collect()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffManifest {
    pub run_id: RunId,
    pub dist_metric: DistanceMetric,
    pub boot_iter: usize,
    pub n_rows: usize,
    pub columns: Vec<String>,
    pub unimputed_columns: Option<Vec<String>>,
}
