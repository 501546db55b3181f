//! Summary statistics of population fitness.

/// Descriptive statistics of a set of fitness scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Middle score; the upper of the two middle scores when the count is even.
    pub median: f64,
    pub std_dev: f64,
}

impl FitnessStats {
    /// Computes statistics from unsorted scores.
    ///
    /// Returns `None` if `values` is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use permaculture_engine::stats::FitnessStats;
    /// let stats = FitnessStats::new([4.0, 1.0, 3.0, 2.0, 5.0]).unwrap();
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 5.0);
    /// assert_eq!(stats.mean, 3.0);
    /// assert_eq!(stats.median, 3.0);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);

        let min = *values.first()?;
        let max = *values.last()?;
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let median = values[values.len() / 2];
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        Some(Self {
            min,
            max,
            mean,
            median,
            std_dev: variance.sqrt(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values() {
        assert_eq!(FitnessStats::new([]), None);
    }

    #[test]
    fn test_constant_values_have_zero_spread() {
        let stats = FitnessStats::new([9.0; 6]).unwrap();
        assert_eq!(stats.min, 9.0);
        assert_eq!(stats.max, 9.0);
        assert_eq!(stats.std_dev, 0.0);
    }

    #[test]
    fn test_negative_scores() {
        let stats = FitnessStats::new([-4.0, 9.0, -4.0, 1.0]).unwrap();
        assert_eq!(stats.min, -4.0);
        assert_eq!(stats.max, 9.0);
        assert_eq!(stats.mean, 0.5);
        assert_eq!(stats.median, 1.0);
    }

    #[test]
    fn test_even_count_median_is_upper_middle() {
        let stats = FitnessStats::new([4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(stats.median, 3.0);
    }
}
