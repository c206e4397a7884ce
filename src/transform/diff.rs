//! Lagged differences and percent changes that preserve series length.

/// Difference a series against itself `periods` steps back.
///
/// `result[i] = series[i] - series[i - periods]`; the first `periods`
/// entries are NaN so the output stays aligned with the input index.
pub fn difference(series: &[f64], periods: usize) -> Vec<f64> {
    lagged(series, periods, |curr, prev| curr - prev)
}

/// Fractional change against the value `periods` steps back.
///
/// `result[i] = (series[i] - series[i - periods]) / series[i - periods]`.
/// A zero base yields an infinite (missing) entry.
pub fn pct_change(series: &[f64], periods: usize) -> Vec<f64> {
    lagged(series, periods, |curr, prev| (curr - prev) / prev)
}

fn lagged<F>(series: &[f64], periods: usize, f: F) -> Vec<f64>
where
    F: Fn(f64, f64) -> f64,
{
    (0..series.len())
        .map(|i| {
            if i < periods {
                f64::NAN
            } else {
                f(series[i], series[i - periods])
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn difference_first_order() {
        let series = vec![1.0, 3.0, 6.0, 10.0];
        let result = difference(&series, 1);

        assert_eq!(result.len(), 4);
        assert!(result[0].is_nan());
        assert_eq!(&result[1..], &[2.0, 3.0, 4.0]);
    }

    #[test]
    fn difference_seasonal_lag() {
        let series = vec![1.0, 2.0, 3.0, 4.0, 6.0, 8.0];
        let result = difference(&series, 3);

        assert!(result[..3].iter().all(|v| v.is_nan()));
        assert_eq!(&result[3..], &[3.0, 4.0, 5.0]);
    }

    #[test]
    fn difference_propagates_missing() {
        let result = difference(&[1.0, f64::NAN, 3.0], 1);
        assert!(result[1].is_nan());
        assert!(result[2].is_nan());
    }

    #[test]
    fn difference_short_series() {
        assert!(difference(&[], 1).is_empty());
        assert!(difference(&[5.0], 1)[0].is_nan());
    }

    #[test]
    fn pct_change_year_over_year() {
        let mut series = vec![100.0; 12];
        series.push(110.0);
        let result = pct_change(&series, 12);

        assert!(result[11].is_nan());
        assert_relative_eq!(result[12], 0.1, epsilon = 1e-12);
    }

    #[test]
    fn pct_change_zero_base_is_infinite() {
        let result = pct_change(&[0.0, 1.0], 1);
        assert!(result[1].is_infinite());
    }
}
