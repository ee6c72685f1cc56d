//! Cleaning of behavioral-task measurement tables before factor analysis
//!
//! This crate turns a raw per-subject table of task variables into the
//! reduced, transformed matrix that exploratory factor analysis and
//! hierarchical clustering consume.
//!
//! # Overview
//!
//! The pipeline runs four stages, in this order:
//!
//! 1. **Variable selection** ([`select::VariableSelector`]): drop columns by
//!    name pattern, keeping any column that matches a saved pattern
//! 2. **Skew correction** ([`skew::SkewCorrector`]): log-transform skewed
//!    columns, keeping a transform only if it brings the skewness under the
//!    threshold
//! 3. **Outlier trimming** ([`outlier::OutlierTrimmer`]): used by skew
//!    correction to evaluate each transform
//! 4. **Correlation pruning** ([`prune::CorrelationPruner`]): drop columns
//!    redundant with an earlier column of the same task
//!
//! [`pipeline::CleaningPipeline`] composes them from a
//! [`config::CleaningConfig`], evaluates [`adequacy`] gates on the result
//! and packages it into an [`handoff::EfaHandoff`].
//!
//! Every stage takes a [`table::NumericTable`] by reference and returns a new
//! one with the same rows, together with a report of the decisions it made.
//!
//! # Examples
//!
//! ```
//! use dimstruct_clean::{
//!     config::CleaningConfig,
//!     patterns::TASK_BATTERY,
//!     pipeline::CleaningPipeline,
//!     table::{Column, NumericTable},
//! };
//!
//! let index = (0..8).map(|i| format!("s{i}")).collect();
//! let table = NumericTable::new(
//!     index,
//!     vec![
//!         Column::from_values("grit_survey.total", [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0]),
//!         Column::from_values("holt_laury_survey.beta", [0.1, 0.3, 0.2, 0.5, 0.4, 0.6, 0.3, 0.2]),
//!         Column::from_values("stroop.stroop_rt", [60.0, 75.0, 80.0, 90.0, 70.0, 85.0, 65.0, 95.0]),
//!     ],
//! )
//! .unwrap();
//!
//! let pipeline = CleaningPipeline::from_config(&CleaningConfig::from_preset(&TASK_BATTERY)).unwrap();
//! let cleaned = pipeline.run(&table).unwrap();
//! assert_eq!(
//!     cleaned.table.column_names().collect::<Vec<_>>(),
//!     ["holt_laury_survey.beta", "stroop.stroop_rt"],
//! );
//! ```

pub mod adequacy;
pub mod config;
pub mod error;
pub mod handoff;
pub mod outlier;
pub mod patterns;
pub mod pipeline;
pub mod prune;
pub mod select;
pub mod skew;
pub mod table;

pub use self::error::{CleanError, ConfigurationError, DataShapeError, InsufficientData};
