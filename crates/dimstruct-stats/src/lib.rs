//! Statistical primitives for the dimstruct cleaning pipeline.
//!
//! This crate provides the small set of numeric building blocks the cleaning
//! stages are made of:
//!
//! - **Quantiles**: Linearly interpolated quantiles over samples with missing values
//! - **Descriptive statistics**: Mean, median, variance and sample skewness
//! - **Correlation**: Pairwise-complete Pearson correlation and correlation matrices
//!
//! Every function here works on `f64` and treats `None` (or NaN) as a missing
//! observation that is skipped, never as a value.
//!
//! # Modules
//!
//! - [`quantiles`]: Quantile computation and storage
//! - [`descriptive`]: Descriptive statistics for summarizing a column
//! - [`correlation`]: Pearson correlation between columns
//!
//! # Examples
//!
//! ## Computing quantiles
//!
//! ```
//! use dimstruct_stats::quantiles::Quantiles;
//!
//! let values = [Some(1.0), Some(2.0), None, Some(3.0), Some(4.0), Some(5.0)];
//! let quantiles = Quantiles::new(values, &[0.25, 0.5, 0.75]);
//! assert_eq!(quantiles.get(0.5), Some(3.0));
//! assert_eq!(quantiles.get(0.25), Some(2.0));
//! ```
//!
//! ## Computing skewness
//!
//! ```
//! use dimstruct_stats::descriptive::DescriptiveStats;
//!
//! let stats = DescriptiveStats::new([1.0, 1.0, 1.0, 1.0, 1.0, 50.0]).unwrap();
//! assert!(stats.skewness > 2.0);
//! ```
//!
//! ## Correlating two columns
//!
//! ```
//! use dimstruct_stats::correlation::pearson;
//!
//! let x = [Some(1.0), Some(2.0), Some(3.0)];
//! let y = [Some(2.0), Some(4.0), Some(6.0)];
//! assert!((pearson(&x, &y).unwrap() - 1.0).abs() < 1e-12);
//! ```

pub mod correlation;
pub mod descriptive;
pub mod quantiles;

/// Iterates over the observed (non-missing, non-NaN) values of a column.
///
/// ```
/// let column = [Some(1.0), None, Some(f64::NAN), Some(2.0)];
/// let observed = dimstruct_stats::observed(&column).collect::<Vec<_>>();
/// assert_eq!(observed, [1.0, 2.0]);
/// ```
pub fn observed(values: &[Option<f64>]) -> impl Iterator<Item = f64> + '_ {
    values.iter().filter_map(|v| v.filter(|x| !x.is_nan()))
}
