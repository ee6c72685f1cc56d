//! Error taxonomy of the cleaning pipeline
//!
//! Structural problems (bad configuration, malformed tables) halt a stage
//! immediately. Column-level data-quality problems are recovered locally by
//! the stages and only surface as [`InsufficientData`] errors when strict
//! mode is requested.

use serde::Serialize;

/// Invalid numeric parameters or malformed patterns.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
pub enum ConfigurationError {
    #[display("quantile multiplier must be positive, got {value}")]
    NonPositiveMultiplier { value: f64 },
    #[display("skew threshold must be positive, got {value}")]
    NonPositiveSkewThreshold { value: f64 },
    #[display("correlation threshold must be in (0, 1], got {value}")]
    CorrelationThresholdOutOfRange { value: f64 },
    #[display("invalid column pattern '{pattern}'")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
    #[display("column '{column}' is listed as both positively and negatively skewed")]
    OverlappingSkewOverride { column: String },
    #[display("unknown distance metric '{name}'")]
    UnknownDistanceMetric { name: String },
}

/// The input table does not have the shape a stage requires.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum DataShapeError {
    #[display("duplicate column name '{name}'")]
    DuplicateColumn { name: String },
    #[display("duplicate row identifier '{id}'")]
    DuplicateRow { id: String },
    #[display("column '{name}' has {len} values but the table has {rows} rows")]
    ColumnLength { name: String, len: usize, rows: usize },
    #[display("non-numeric value '{value}' in column '{column}' at row '{row}'")]
    NonNumeric {
        column: String,
        row: String,
        value: String,
    },
    #[display("non-finite value '{value}' in column '{column}' at row '{row}'")]
    NonFinite {
        column: String,
        row: String,
        value: String,
    },
    #[display("unknown column '{name}'")]
    UnknownColumn { name: String },
    #[display("saved pattern '{pattern}' matches no column")]
    UnmatchedSavedPattern { pattern: String },
    #[display("row identifiers of the two tables differ")]
    RowMismatch,
    #[display("column '{name}' is present in only one of the two tables")]
    ColumnMismatch { name: String },
}

/// A column has too few observed values for quantiles or skewness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_more::Display, derive_more::Error)]
#[display("column '{column}' has {observed} observed values, at least {required} are needed")]
pub struct InsufficientData {
    pub column: String,
    pub observed: usize,
    pub required: usize,
}

/// Any error a cleaning stage can halt with.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum CleanError {
    #[display("invalid configuration")]
    Configuration(ConfigurationError),
    #[display("malformed table")]
    DataShape(DataShapeError),
    #[display("insufficient data")]
    InsufficientData(InsufficientData),
}
