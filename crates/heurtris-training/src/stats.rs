/// Summary of one column of the per-generation report.
///
/// The report prints one over the fitness of the population and one per
/// weight slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub min: f64,
    pub median: f64,
    pub max: f64,
    pub mean: f64,
    /// Standard deviation divided by the range; 0 for a constant column.
    pub normalized_std_dev: f64,
}

impl Summary {
    /// Summarizes `values`, or `None` if there are none.
    ///
    /// The median of an even count is the upper of the two middle values.
    ///
    /// ```
    /// # use heurtris_training::stats::Summary;
    /// let summary = Summary::of([5.0, 2.0, 4.0, 1.0, 3.0]).unwrap();
    /// assert_eq!((summary.min, summary.median, summary.max), (1.0, 3.0, 5.0));
    /// assert_eq!(summary.mean, 3.0);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn of<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        let (&min, &max) = (values.first()?, values.last()?);

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let range = max - min;
        // a range this small is a constant column at any scale
        let normalized_std_dev = if range.abs() <= mean.abs() * f64::EPSILON {
            0.0
        } else {
            variance.sqrt() / range
        };

        Some(Self {
            min,
            median: values[values.len() / 2],
            max,
            mean,
            normalized_std_dev,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_values() {
        assert_eq!(Summary::of([0.0_f64; 0]), None);
    }

    #[test]
    fn test_constant_column_has_no_spread() {
        let summary = Summary::of([0.25; 4]).unwrap();
        assert_eq!(summary.normalized_std_dev, 0.0);
        assert_eq!(summary.median, 0.25);
    }

    #[test]
    fn test_two_values() {
        let summary = Summary::of([3.0, 1.0]).unwrap();
        assert_eq!(summary.mean, 2.0);
        assert_eq!(summary.median, 3.0);
        assert_eq!(summary.normalized_std_dev, 0.5);
    }
}
