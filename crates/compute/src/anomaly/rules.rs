//! Snapshot rule engine.
//!
//! Five independent checks comparing the current period against the
//! previous one. Pure: no I/O, no clock.

use tracing::{debug, warn};

use adpulse_rules::AnomalyThresholds;

use super::{AnomalyInput, AnomalySeverity, AnomalyType, DetectedAnomaly};
use crate::stats::{finite_or_zero, percent_change};

/// Multiplier over the warning threshold at which a change becomes critical.
pub const CRITICAL_FACTOR: f64 = 1.5;
/// Spend velocity uses a tighter critical band.
pub const SPEND_VELOCITY_CRITICAL_FACTOR: f64 = 1.3;

const HOURS_PER_DAY: f64 = 24.0;

/// Run every rule against `input` and return the hits in check order:
/// CPA, CTR, impressions, spend velocity, ROAS.
///
/// `thresholds` are used as given; per-call overrides on the input are the
/// coordinator's concern.
pub fn detect_anomalies_rule_based(
    input: &AnomalyInput,
    thresholds: &AnomalyThresholds,
) -> Vec<DetectedAnomaly> {
    let current = &input.current;
    let previous = &input.previous;
    let mut anomalies = Vec::new();

    let cpa_change = percent_change(current.cpa, previous.cpa);
    if let Some(severity) = severity_for(cpa_change, thresholds.cpa_spike, CRITICAL_FACTOR) {
        anomalies.push(DetectedAnomaly {
            anomaly_type: AnomalyType::CpaSpike,
            severity,
            metric: "cpa".into(),
            current_value: current.cpa,
            previous_value: previous.cpa,
            change_percent: cpa_change,
            threshold: thresholds.cpa_spike,
            message: format!(
                "CPA rose {cpa_change:.1}% ({:.2} -> {:.2})",
                previous.cpa, current.cpa
            ),
        });
    }

    let ctr_change = percent_change(current.ctr, previous.ctr);
    if let Some(severity) = severity_for(-ctr_change, thresholds.ctr_drop, CRITICAL_FACTOR) {
        anomalies.push(DetectedAnomaly {
            anomaly_type: AnomalyType::CtrDrop,
            severity,
            metric: "ctr".into(),
            current_value: current.ctr,
            previous_value: previous.ctr,
            change_percent: ctr_change,
            threshold: thresholds.ctr_drop,
            message: format!(
                "CTR fell {:.1}% ({:.2}% -> {:.2}%)",
                -ctr_change, previous.ctr, current.ctr
            ),
        });
    }

    let impressions_change = percent_change(current.impressions as f64, previous.impressions as f64);
    if -impressions_change >= thresholds.impression_drop {
        anomalies.push(DetectedAnomaly {
            anomaly_type: AnomalyType::ImpressionDrop,
            severity: AnomalySeverity::Critical,
            metric: "impressions".into(),
            current_value: current.impressions as f64,
            previous_value: previous.impressions as f64,
            change_percent: impressions_change,
            threshold: thresholds.impression_drop,
            message: format!(
                "Impressions fell {:.1}% ({} -> {}); check delivery and budget",
                -impressions_change, previous.impressions, current.impressions
            ),
        });
    }

    if let Some(anomaly) = spend_velocity(input, thresholds.spend_velocity) {
        anomalies.push(anomaly);
    }

    if previous.roas != 0.0 {
        let roas_change = percent_change(current.roas, previous.roas);
        if let Some(severity) = severity_for(-roas_change, thresholds.roas_drop, CRITICAL_FACTOR) {
            anomalies.push(DetectedAnomaly {
                anomaly_type: AnomalyType::RoasDrop,
                severity,
                metric: "roas".into(),
                current_value: current.roas,
                previous_value: previous.roas,
                change_percent: roas_change,
                threshold: thresholds.roas_drop,
                message: format!(
                    "ROAS fell {:.1}% ({:.2} -> {:.2})",
                    -roas_change, previous.roas, current.roas
                ),
            });
        }
    }

    for a in &anomalies {
        debug!(
            account_id = input.account_id.as_deref().unwrap_or("-"),
            anomaly = %a.anomaly_type,
            severity = %a.severity,
            change = a.change_percent,
            "rule hit"
        );
    }

    anomalies
}

/// Pacing check: spend-so-far as a share of the daily budget against the
/// share of the day elapsed, assuming linear delivery across 24 hours.
///
/// Skipped without a positive budget and at hour 0, where nothing is
/// expected to have been spent yet.
fn spend_velocity(input: &AnomalyInput, threshold: f64) -> Option<DetectedAnomaly> {
    let budget = input.daily_budget.filter(|b| *b > 0.0)?;
    let Some(hour_of_day) = input.hour_of_day else {
        warn!(
            account_id = input.account_id.as_deref().unwrap_or("-"),
            "daily budget given without hour of day, spend velocity not checked"
        );
        return None;
    };
    let hour = f64::from(hour_of_day.min(24));

    let spend_rate = input.current.spend / budget * 100.0;
    let expected_rate = hour / HOURS_PER_DAY * 100.0;
    if expected_rate <= 0.0 {
        return None;
    }

    let velocity = finite_or_zero(spend_rate / expected_rate * 100.0);
    let severity = severity_for(velocity, threshold, SPEND_VELOCITY_CRITICAL_FACTOR)?;

    Some(DetectedAnomaly {
        anomaly_type: AnomalyType::SpendVelocity,
        severity,
        metric: "spend".into(),
        current_value: input.current.spend,
        previous_value: budget * hour / HOURS_PER_DAY,
        change_percent: velocity,
        threshold,
        message: format!(
            "Spending at {velocity:.0}% of expected pace: {spend_rate:.1}% of the daily budget used by hour {hour_of_day}"
        ),
    })
}

/// `value ≥ threshold × factor` is critical, `value ≥ threshold` a warning.
fn severity_for(value: f64, threshold: f64, critical_factor: f64) -> Option<AnomalySeverity> {
    if value >= threshold * critical_factor {
        Some(AnomalySeverity::Critical)
    } else if value >= threshold {
        Some(AnomalySeverity::Warning)
    } else {
        None
    }
}
