//! Small numeric helpers shared by the calculators.
//!
//! All helpers return 0.0 rather than NaN for empty or degenerate input.

/// Arithmetic mean. Empty input yields 0.0.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by n). Fewer than 2 values yield 0.0.
pub fn population_stddev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Least-squares slope of `values` against their index (0, 1, 2, ...).
///
/// Units are value-per-step. Fewer than 2 values yield 0.0.
pub fn linear_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let n_f = n as f64;
    let sum_x: f64 = (0..n).map(|i| i as f64).sum();
    let sum_y: f64 = values.iter().sum();
    let sum_xy: f64 = values.iter().enumerate().map(|(i, y)| i as f64 * y).sum();
    let sum_x2: f64 = (0..n).map(|i| (i as f64).powi(2)).sum();

    let denominator = n_f * sum_x2 - sum_x * sum_x;
    if denominator.abs() <= f64::EPSILON {
        return 0.0;
    }
    finite_or_zero((n_f * sum_xy - sum_x * sum_y) / denominator)
}

/// Trailing simple moving average with the given window.
///
/// Element `i` averages `values[i + 1 - window ..= i]`; the output has
/// `len - window + 1` elements (empty if the series is shorter than the window).
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || values.len() < window {
        return Vec::new();
    }
    values.windows(window).map(mean).collect()
}

/// Percent change from `previous` to `current`.
///
/// When `previous` is zero there is no meaningful ratio: the result is 100
/// if `current` is positive and 0 otherwise.
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return if current > 0.0 { 100.0 } else { 0.0 };
    }
    finite_or_zero((current - previous) / previous * 100.0)
}

/// Replace NaN / infinity with 0.0.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_stddev() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&values) - 5.0).abs() < 1e-10);
        assert!((population_stddev(&values) - 2.0).abs() < 1e-10);
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(population_stddev(&[3.0]), 0.0);
    }

    #[test]
    fn slope_of_straight_line() {
        assert!((linear_slope(&[1.0, 1.5, 2.0, 2.5]) - 0.5).abs() < 1e-10);
        assert!((linear_slope(&[3.0, 2.0, 1.0]) + 1.0).abs() < 1e-10);
        assert_eq!(linear_slope(&[4.0, 4.0, 4.0]), 0.0);
        assert_eq!(linear_slope(&[4.0]), 0.0);
    }

    #[test]
    fn moving_average_trailing_window() {
        let ma = moving_average(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(ma, vec![2.0, 3.0]);
        assert!(moving_average(&[1.0, 2.0], 3).is_empty());
    }

    #[test]
    fn percent_change_zero_previous_convention() {
        assert_eq!(percent_change(5.0, 0.0), 100.0);
        assert_eq!(percent_change(0.0, 0.0), 0.0);
        assert_eq!(percent_change(-1.0, 0.0), 0.0);
        assert!((percent_change(13_000.0, 10_000.0) - 30.0).abs() < 1e-10);
        assert!((percent_change(80.0, 100.0) + 20.0).abs() < 1e-10);
    }

    #[test]
    fn non_finite_values_zeroed() {
        assert_eq!(finite_or_zero(f64::NAN), 0.0);
        assert_eq!(finite_or_zero(f64::INFINITY), 0.0);
        assert_eq!(finite_or_zero(1.5), 1.5);
    }
}
