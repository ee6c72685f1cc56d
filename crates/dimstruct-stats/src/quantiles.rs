/// Precomputed quantile values for a column.
///
/// This structure stores quantile-value pairs for efficient lookup of the
/// handful of points a cleaning stage needs (typically Q1, median and Q3).
///
/// # Examples
///
/// ```
/// use dimstruct_stats::quantiles::Quantiles;
///
/// let values = [Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0), Some(100.0)];
/// let quantiles = Quantiles::new(values, &[0.25, 0.5, 0.75]);
///
/// assert_eq!(quantiles.get(0.25), Some(2.25));
/// assert_eq!(quantiles.get(0.5), Some(3.5));
/// assert_eq!(quantiles.get(0.75), Some(4.75));
/// ```
#[derive(Debug, Clone)]
pub struct Quantiles {
    /// Quantile-value pairs in the order they were requested.
    /// Each tuple contains (quantile, value) where quantile is 0.0-1.0.
    values: Vec<(f64, f64)>,
    /// Number of observed values the quantiles were computed from.
    count: usize,
}

impl Quantiles {
    /// Computes quantiles from sorted values.
    ///
    /// # Arguments
    ///
    /// * `sorted_values` - Observed values sorted in ascending order (no NaN)
    /// * `quantile_points` - The quantile points to compute (e.g., [0.25, 0.5, 0.75])
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64], quantile_points: &[f64]) -> Self {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let values = quantile_points
            .iter()
            .map(|&q| (q, quantile(sorted_values, q)))
            .collect();
        Self {
            values,
            count: sorted_values.len(),
        }
    }

    /// Computes quantiles from a column that may contain missing values.
    ///
    /// Missing entries (`None` or NaN) are skipped before sorting.
    ///
    /// # Examples
    ///
    /// ```
    /// use dimstruct_stats::quantiles::Quantiles;
    ///
    /// let quantiles = Quantiles::new([None, Some(4.0), Some(2.0)], &[0.5]);
    /// assert_eq!(quantiles.get(0.5), Some(3.0));
    /// assert_eq!(quantiles.count(), 2);
    /// ```
    #[must_use]
    pub fn new<I>(values: I, quantile_points: &[f64]) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let mut sorted = values
            .into_iter()
            .flatten()
            .filter(|v| !v.is_nan())
            .collect::<Vec<_>>();
        sorted.sort_by(f64::total_cmp);
        Self::from_sorted(&sorted, quantile_points)
    }

    /// Gets the value at a specific quantile.
    ///
    /// Returns `None` if the quantile was not precomputed. A precomputed
    /// quantile of an empty column is `Some(NaN)`.
    #[must_use]
    pub fn get(&self, q: f64) -> Option<f64> {
        self.values.iter().find_map(|(p, value)| {
            if (*p - q).abs() < f64::EPSILON {
                Some(*value)
            } else {
                None
            }
        })
    }

    /// Number of observed values behind these quantiles.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns an iterator over all (quantile, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.values.iter().copied()
    }
}

/// Computes a single quantile from sorted data.
///
/// Uses linear interpolation between the two closest ranks: the quantile
/// `q` sits at fractional position `q * (n - 1)` of the sorted data.
///
/// Returns `f64::NAN` if the input is empty.
///
/// # Examples
///
/// ```
/// use dimstruct_stats::quantiles::quantile;
///
/// let values = [1.0, 2.0, 3.0, 4.0];
/// assert_eq!(quantile(&values, 0.5), 2.5);
/// assert_eq!(quantile(&values, 0.0), 1.0);
/// assert_eq!(quantile(&values, 1.0), 4.0);
/// assert!(quantile(&[], 0.5).is_nan());
/// ```
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn quantile(sorted_values: &[f64], q: f64) -> f64 {
    if sorted_values.is_empty() {
        return f64::NAN;
    }
    let q = q.clamp(0.0, 1.0);
    let position = q * (sorted_values.len() - 1) as f64;
    let lo = position.floor() as usize;
    let hi = position.ceil() as usize;
    let fraction = position - lo as f64;
    let (low, high) = (sorted_values[lo], sorted_values[hi]);
    if lo == hi || low == high {
        low
    } else {
        low + (high - low) * fraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_value() {
        let quantiles = Quantiles::new([Some(7.0)], &[0.25, 0.5, 0.75]);
        assert_eq!(quantiles.get(0.25), Some(7.0));
        assert_eq!(quantiles.get(0.75), Some(7.0));
    }

    #[test]
    fn test_empty_column_is_nan() {
        let quantiles = Quantiles::new([None, None], &[0.5]);
        assert_eq!(quantiles.count(), 0);
        assert!(quantiles.get(0.5).unwrap().is_nan());
    }

    #[test]
    fn test_nan_is_treated_as_missing() {
        let quantiles = Quantiles::new([Some(f64::NAN), Some(1.0), Some(3.0)], &[0.5]);
        assert_eq!(quantiles.count(), 2);
        assert_eq!(quantiles.get(0.5), Some(2.0));
    }

    #[test]
    fn test_not_precomputed() {
        let quantiles = Quantiles::new([Some(1.0), Some(2.0)], &[0.5]);
        assert_eq!(quantiles.get(0.9), None);
    }

    #[test]
    fn test_interpolation() {
        let values = [10.0, 20.0, 30.0, 40.0, 50.0];
        assert!((quantile(&values, 0.1) - 14.0).abs() < 1e-12);
        assert!((quantile(&values, 0.75) - 40.0).abs() < 1e-12);
    }
}
