use std::iter;

/// Computes the Pearson correlation between two columns.
///
/// Only pairwise-complete observations are used: a row contributes when
/// both columns have an observed (non-missing, non-NaN) value in it.
///
/// # Returns
///
/// * `Some(r)` - the correlation coefficient
/// * `None` - if fewer than two complete pairs exist, or either column is
///   constant over those pairs
///
/// # Examples
///
/// ```
/// use dimstruct_stats::correlation::pearson;
///
/// let x = [Some(1.0), Some(2.0), Some(3.0), None];
/// let y = [Some(3.0), Some(2.0), Some(1.0), Some(0.0)];
/// assert!((pearson(&x, &y).unwrap() + 1.0).abs() < 1e-12);
///
/// let constant = [Some(5.0), Some(5.0), Some(5.0), Some(5.0)];
/// assert_eq!(pearson(&x, &constant), None);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs = iter::zip(x, y)
        .filter_map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) if !a.is_nan() && !b.is_nan() => Some((*a, *b)),
            _ => None,
        })
        .collect::<Vec<_>>();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;
    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    let divisor = (sxx * syy).sqrt();
    if divisor == 0.0 {
        return None;
    }
    Some(sxy / divisor)
}

/// Symmetric matrix of pairwise Pearson correlations.
///
/// Entries for pairs whose correlation is undefined (see [`pearson`]) are
/// stored as `None`.
///
/// # Examples
///
/// ```
/// use dimstruct_stats::correlation::CorrelationMatrix;
///
/// let a = vec![Some(1.0), Some(2.0), Some(3.0)];
/// let b = vec![Some(1.0), Some(2.0), Some(2.5)];
/// let matrix = CorrelationMatrix::from_columns(&[a.as_slice(), b.as_slice()]);
///
/// assert_eq!(matrix.size(), 2);
/// assert_eq!(matrix.get(0, 1), matrix.get(1, 0));
/// ```
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    size: usize,
    values: Vec<Option<f64>>,
}

impl CorrelationMatrix {
    /// Builds the correlation matrix of the given columns, in the given order.
    #[must_use]
    pub fn from_columns(columns: &[&[Option<f64>]]) -> Self {
        let size = columns.len();
        let mut values = vec![None; size * size];
        for i in 0..size {
            for j in i..size {
                let r = pearson(columns[i], columns[j]);
                values[i * size + j] = r;
                values[j * size + i] = r;
            }
        }
        Self { size, values }
    }

    /// Number of rows (and columns) of the matrix.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the correlation between columns `i` and `j`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        assert!(i < self.size && j < self.size, "index out of range");
        self.values[i * self.size + j]
    }

    /// Replaces the diagonal with zero so a column never correlates with itself.
    #[must_use]
    pub fn with_zero_diagonal(mut self) -> Self {
        for i in 0..self.size {
            self.values[i * self.size + i] = Some(0.0);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_pair_is_undefined() {
        assert_eq!(pearson(&[Some(1.0), None], &[Some(2.0), Some(3.0)]), None);
    }

    #[test]
    fn test_uncorrelated() {
        let x = [Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
        let y = [Some(1.0), Some(-1.0), Some(-1.0), Some(1.0)];
        assert!(pearson(&x, &y).unwrap().abs() < 1e-12);
    }

    #[test]
    fn test_zero_diagonal() {
        let a = vec![Some(1.0), Some(2.0), Some(4.0)];
        let b = vec![Some(3.0), Some(1.0), Some(2.0)];
        let matrix = CorrelationMatrix::from_columns(&[a.as_slice(), b.as_slice()]);
        assert!((matrix.get(0, 0).unwrap() - 1.0).abs() < 1e-12);

        let matrix = matrix.with_zero_diagonal();
        assert_eq!(matrix.get(0, 0), Some(0.0));
        assert_eq!(matrix.get(1, 1), Some(0.0));
        assert!(matrix.get(0, 1).unwrap() < 0.0);
    }
}
