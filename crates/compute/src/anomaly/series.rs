//! Time-series variant of the anomaly detector.
//!
//! Compares the latest value of a single metric against its 3-point moving
//! average, scaled by the standard deviation of the whole series. Never
//! escalates to the narrative collaborator.

use tracing::debug;

use adpulse_core::SeriesPoint;

use super::{AnomalySeverity, AnomalyType, DetectedAnomaly};
use crate::stats::{mean, moving_average, percent_change, population_stddev};

pub const MOVING_AVERAGE_WINDOW: usize = 3;
/// Deviation (in standard deviations) above which the latest value is flagged.
pub const WARNING_SIGMA: f64 = 2.0;
pub const CRITICAL_SIGMA: f64 = 3.0;

/// Check the most recent point of `series` for a deviation from trend.
///
/// Needs at least 3 points; shorter or constant series yield no anomalies.
/// The result holds at most one anomaly of type `OTHER`, whose `threshold`
/// is the sigma multiple that was exceeded.
pub fn detect_trend_anomalies(metric: &str, series: &[SeriesPoint]) -> Vec<DetectedAnomaly> {
    if series.len() < MOVING_AVERAGE_WINDOW {
        return Vec::new();
    }

    let mut sorted: Vec<&SeriesPoint> = series.iter().collect();
    sorted.sort_by_key(|p| p.date);
    let values: Vec<f64> = sorted.iter().map(|p| p.value).collect();

    let averages = moving_average(&values, MOVING_AVERAGE_WINDOW);
    let (Some(&latest_average), Some(&latest)) = (averages.last(), values.last()) else {
        return Vec::new();
    };

    let stddev = population_stddev(&values);
    if stddev <= f64::EPSILON {
        return Vec::new();
    }

    let deviation = (latest - latest_average).abs();
    let sigmas = deviation / stddev;
    let (severity, threshold) = if sigmas > CRITICAL_SIGMA {
        (AnomalySeverity::Critical, CRITICAL_SIGMA)
    } else if sigmas > WARNING_SIGMA {
        (AnomalySeverity::Warning, WARNING_SIGMA)
    } else {
        return Vec::new();
    };

    debug!(metric, latest, latest_average, stddev, sigmas, "trend anomaly");

    let direction = if latest > latest_average { "above" } else { "below" };
    vec![DetectedAnomaly {
        anomaly_type: AnomalyType::Other,
        severity,
        metric: metric.to_string(),
        current_value: latest,
        previous_value: latest_average,
        change_percent: percent_change(latest, latest_average),
        threshold,
        message: format!(
            "{metric} is {sigmas:.1} standard deviations {direction} its moving average \
             ({latest:.2} vs {latest_average:.2}, series mean {:.2})",
            mean(&values)
        ),
    }]
}

#[cfg(test)]
mod tests {
    use chrono::{Days, NaiveDate};

    use super::*;

    fn points(values: &[f64]) -> Vec<SeriesPoint> {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| SeriesPoint {
                date: start.checked_add_days(Days::new(i as u64)).unwrap(),
                value,
            })
            .collect()
    }

    fn noisy_baseline_then(last: f64) -> Vec<f64> {
        let mut values: Vec<f64> = [9.0, 11.0].repeat(10);
        values.push(last);
        values
    }

    #[test]
    fn too_short_series() {
        assert!(detect_trend_anomalies("spend", &points(&[1.0, 100.0])).is_empty());
        assert!(detect_trend_anomalies("spend", &[]).is_empty());
    }

    #[test]
    fn constant_series_has_no_deviation() {
        assert!(detect_trend_anomalies("ctr", &points(&[5.0, 5.0, 5.0])).is_empty());
    }

    #[test]
    fn steady_growth_is_not_anomalous() {
        let series = points(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert!(detect_trend_anomalies("impressions", &series).is_empty());
    }

    #[test]
    fn moderate_spike_is_warning() {
        // Deviation ≈ 2.85σ.
        let hits = detect_trend_anomalies("spend", &points(&noisy_baseline_then(20.0)));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].anomaly_type, AnomalyType::Other);
        assert_eq!(hits[0].severity, AnomalySeverity::Warning);
        assert_eq!(hits[0].metric, "spend");
        assert_eq!(hits[0].current_value, 20.0);
        assert_eq!(hits[0].threshold, WARNING_SIGMA);
    }

    #[test]
    fn drops_are_flagged_too() {
        let hits = detect_trend_anomalies("ctr", &points(&noisy_baseline_then(2.0)));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].severity, AnomalySeverity::Warning);
        assert!(hits[0].message.contains("below"));
        assert!(hits[0].change_percent < 0.0);
    }

    #[test]
    fn large_spike_is_critical() {
        let mut values = vec![10.0; 29];
        values.push(40.0);
        let hits = detect_trend_anomalies("cpa", &points(&values));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].severity, AnomalySeverity::Critical);
        assert!((hits[0].previous_value - 20.0).abs() < 1e-10);
        assert_eq!(hits[0].threshold, CRITICAL_SIGMA);
    }

    #[test]
    fn input_order_does_not_matter() {
        let sorted = points(&noisy_baseline_then(20.0));
        let mut shuffled = sorted.clone();
        shuffled.reverse();
        assert_eq!(
            detect_trend_anomalies("spend", &shuffled),
            detect_trend_anomalies("spend", &sorted)
        );
    }
}
