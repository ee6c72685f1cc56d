use crate::quantiles;

/// Sums of squared/cubed deviations below this magnitude are floating-point noise.
const MOMENT_EPSILON: f64 = 1e-14;

/// Descriptive statistics summarizing a column.
///
/// This structure contains measures of central tendency, dispersion and
/// asymmetry for the observed values of a column.
#[derive(Debug, Clone)]
pub struct DescriptiveStats {
    /// Number of observed values.
    pub count: usize,
    /// The minimum value.
    pub min: f64,
    /// The maximum value.
    pub max: f64,
    /// The arithmetic mean.
    pub mean: f64,
    /// The median (linearly interpolated for even counts).
    pub median: f64,
    /// The unbiased sample variance (`n - 1` denominator). NaN for a single value.
    pub variance: f64,
    /// The sample skewness, see [`skewness`].
    pub skewness: f64,
}

impl DescriptiveStats {
    /// Computes descriptive statistics from unsorted values.
    ///
    /// NaN entries are skipped.
    ///
    /// # Returns
    ///
    /// * `Some(DescriptiveStats)` - if at least one value was observed
    /// * `None` - if the column is empty
    ///
    /// # Examples
    ///
    /// ```
    /// # use dimstruct_stats::descriptive::DescriptiveStats;
    /// let stats = DescriptiveStats::new([5.0, 2.0, 4.0, 1.0, 3.0]).unwrap();
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 5.0);
    /// assert_eq!(stats.mean, 3.0);
    /// assert_eq!(stats.median, 3.0);
    /// assert_eq!(stats.skewness, 0.0);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values
            .into_iter()
            .filter(|v| !v.is_nan())
            .collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        Self::from_sorted(&values)
    }

    /// Computes descriptive statistics from pre-sorted values.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64]) -> Option<Self> {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let min = *sorted_values.first()?;
        let max = *sorted_values.last()?;
        let count = sorted_values.len();
        let n = count as f64;
        let mean = sorted_values.iter().sum::<f64>() / n;
        let median = quantiles::quantile(sorted_values, 0.5);
        let variance = if count < 2 {
            f64::NAN
        } else {
            sorted_values
                .iter()
                .map(|v| (v - mean).powi(2))
                .sum::<f64>()
                / (n - 1.0)
        };

        Some(Self {
            count,
            min,
            max,
            mean,
            median,
            variance,
            skewness: skewness(sorted_values),
        })
    }
}

/// Computes the sample skewness of a set of observed values.
///
/// This is the adjusted Fisher-Pearson standardized moment coefficient
///
/// ```text
/// G1 = n * sqrt(n - 1) / (n - 2) * M3 / M2^1.5
/// ```
///
/// where `M2` and `M3` are the sums of squared and cubed deviations from the
/// mean. Sums whose magnitude is below `1e-14` are treated as exactly zero.
///
/// # Returns
///
/// * NaN if fewer than 3 values are given
/// * `0.0` if the values have zero variance
///
/// # Examples
///
/// ```
/// use dimstruct_stats::descriptive::skewness;
///
/// assert!(skewness(&[1.0, 2.0]).is_nan());
/// assert_eq!(skewness(&[4.0, 4.0, 4.0]), 0.0);
/// assert!(skewness(&[1.0, 1.0, 1.0, 1.0, 1.0, 50.0]) > 1.0);
/// assert!(skewness(&[-50.0, 1.0, 1.0, 1.0, 1.0, 1.0]) < -1.0);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn skewness(values: &[f64]) -> f64 {
    let count = values.len();
    if count < 3 {
        return f64::NAN;
    }
    let n = count as f64;
    let mean = values.iter().sum::<f64>() / n;
    let (mut m2, mut m3) = (0.0, 0.0);
    for v in values {
        let d = v - mean;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
    }
    if m2.abs() < MOMENT_EPSILON {
        m2 = 0.0;
    }
    if m3.abs() < MOMENT_EPSILON {
        m3 = 0.0;
    }
    if m2 == 0.0 {
        return 0.0;
    }
    (n * (n - 1.0).sqrt() / (n - 2.0)) * (m3 / m2.powf(1.5))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values() {
        assert!(DescriptiveStats::new(Vec::<f64>::new()).is_none());
        assert!(DescriptiveStats::new([f64::NAN]).is_none());
    }

    #[test]
    fn test_single_value() {
        let stats = DescriptiveStats::new([3.0]).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.median, 3.0);
        assert!(stats.variance.is_nan());
        assert!(stats.skewness.is_nan());
    }

    #[test]
    fn test_even_median_interpolates() {
        let stats = DescriptiveStats::new([4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(stats.median, 2.5);
        assert!((stats.variance - 5.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_skewness_known_value() {
        // n = 6, one value far to the right of five equal ones:
        // G1 = sqrt(6) exactly for this shape.
        let skew = skewness(&[1.0, 1.0, 1.0, 1.0, 1.0, 50.0]);
        assert!((skew - 6.0_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_skewness_sign_flips_under_reflection() {
        let values = [0.5, 1.0, 2.0, 4.0, 9.0, 20.0];
        let reflected = values.iter().map(|v| -v).collect::<Vec<_>>();
        assert!((skewness(&values) + skewness(&reflected)).abs() < 1e-12);
    }
}
