//! Anomaly detection for account-level metrics.
//!
//! Sub-modules:
//! - [`rules`]: pure snapshot rule engine (current vs. previous period)
//! - [`series`]: moving-average / standard-deviation check on a single metric
//! - [`narrative`]: the external narrative collaborator interface and its schema
//! - [`detector`]: coordinator: rules first, narrative only on a hit
//! - [`report`]: human-readable text rendering of a detection result

pub mod detector;
pub mod narrative;
pub mod report;
pub mod rules;
pub mod series;

use std::fmt;

use serde::{Deserialize, Serialize};

use adpulse_core::{AdpulseError, MetricsSnapshot};
use adpulse_rules::ThresholdOverrides;

pub use detector::AnomalyDetector;
pub use narrative::{AiInsight, InsightSeverity, NarrativeError, NarrativeGenerator, NarrativeRequest};
pub use report::format_anomaly_report;
pub use rules::detect_anomalies_rule_based;
pub use series::detect_trend_anomalies;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnomalyType {
    CpaSpike,
    CtrDrop,
    ImpressionDrop,
    SpendVelocity,
    RoasDrop,
    Other,
}

impl AnomalyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyType::CpaSpike => "CPA_SPIKE",
            AnomalyType::CtrDrop => "CTR_DROP",
            AnomalyType::ImpressionDrop => "IMPRESSION_DROP",
            AnomalyType::SpendVelocity => "SPEND_VELOCITY",
            AnomalyType::RoasDrop => "ROAS_DROP",
            AnomalyType::Other => "OTHER",
        }
    }
}

impl fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnomalySeverity {
    Warning,
    Critical,
}

impl fmt::Display for AnomalySeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AnomalySeverity::Warning => "WARNING",
            AnomalySeverity::Critical => "CRITICAL",
        })
    }
}

/// Severity of a whole detection result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallSeverity {
    #[default]
    None,
    Warning,
    Critical,
}

impl fmt::Display for OverallSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OverallSeverity::None => "NONE",
            OverallSeverity::Warning => "WARNING",
            OverallSeverity::Critical => "CRITICAL",
        })
    }
}

/// A single rule or trend hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedAnomaly {
    #[serde(rename = "type")]
    pub anomaly_type: AnomalyType,
    pub severity: AnomalySeverity,
    pub metric: String,
    pub current_value: f64,
    pub previous_value: f64,
    /// Percent change between the periods. For `SPEND_VELOCITY` this is the
    /// pacing ratio (actual vs. expected spend, in %).
    pub change_percent: f64,
    /// The warning-level threshold the value was compared against.
    pub threshold: f64,
    pub message: String,
}

/// Input to one detection call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyInput {
    #[serde(default)]
    pub account_id: Option<String>,
    pub current: MetricsSnapshot,
    pub previous: MetricsSnapshot,
    /// Enables the spend-velocity check when present and positive.
    #[serde(default)]
    pub daily_budget: Option<f64>,
    /// Hour of the current day (0–23) that `current.spend` covers. Required
    /// whenever `daily_budget` is set.
    #[serde(default)]
    pub hour_of_day: Option<u32>,
    /// Per-call threshold overrides, merged over the detector's thresholds.
    #[serde(default)]
    pub thresholds: Option<ThresholdOverrides>,
}

impl AnomalyInput {
    /// A daily budget without the hour it is paced against cannot be
    /// checked, so reject it instead of silently skipping the check.
    pub fn validate(&self) -> adpulse_core::Result<()> {
        if self.daily_budget.is_some() && self.hour_of_day.is_none() {
            return Err(AdpulseError::InvalidInput(
                "dailyBudget requires hourOfDay for the spend velocity check".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyDetectionResult {
    pub rule_based_anomalies: Vec<DetectedAnomaly>,
    pub ai_insights: Vec<AiInsight>,
    pub has_anomalies: bool,
    pub overall_severity: OverallSeverity,
}

impl AnomalyDetectionResult {
    /// Build a result and derive `has_anomalies` / `overall_severity`.
    ///
    /// CRITICAL if any rule-based or AI item is critical, WARNING if any item
    /// exists, otherwise NONE.
    pub fn new(rule_based_anomalies: Vec<DetectedAnomaly>, ai_insights: Vec<AiInsight>) -> Self {
        let any_critical = rule_based_anomalies
            .iter()
            .any(|a| a.severity == AnomalySeverity::Critical)
            || ai_insights
                .iter()
                .any(|i| i.severity == InsightSeverity::Critical);

        let overall_severity = if any_critical {
            OverallSeverity::Critical
        } else if !rule_based_anomalies.is_empty() || !ai_insights.is_empty() {
            OverallSeverity::Warning
        } else {
            OverallSeverity::None
        };

        Self {
            has_anomalies: !rule_based_anomalies.is_empty(),
            rule_based_anomalies,
            ai_insights,
            overall_severity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anomaly(severity: AnomalySeverity) -> DetectedAnomaly {
        DetectedAnomaly {
            anomaly_type: AnomalyType::CtrDrop,
            severity,
            metric: "ctr".into(),
            current_value: 0.7,
            previous_value: 1.0,
            change_percent: -30.0,
            threshold: 20.0,
            message: String::new(),
        }
    }

    #[test]
    fn empty_result_has_no_severity() {
        let r = AnomalyDetectionResult::new(Vec::new(), Vec::new());
        assert!(!r.has_anomalies);
        assert_eq!(r.overall_severity, OverallSeverity::None);
    }

    #[test]
    fn critical_rule_dominates() {
        let r = AnomalyDetectionResult::new(
            vec![anomaly(AnomalySeverity::Warning), anomaly(AnomalySeverity::Critical)],
            Vec::new(),
        );
        assert!(r.has_anomalies);
        assert_eq!(r.overall_severity, OverallSeverity::Critical);
    }

    #[test]
    fn warning_only() {
        let r = AnomalyDetectionResult::new(vec![anomaly(AnomalySeverity::Warning)], Vec::new());
        assert_eq!(r.overall_severity, OverallSeverity::Warning);
    }

    #[test]
    fn wire_format() {
        let json = serde_json::to_value(anomaly(AnomalySeverity::Critical)).unwrap();
        assert_eq!(json["type"], "CTR_DROP");
        assert_eq!(json["severity"], "CRITICAL");
        assert_eq!(json["changePercent"], -30.0);

        let r = AnomalyDetectionResult::new(Vec::new(), Vec::new());
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["overallSeverity"], "NONE");
        assert_eq!(json["hasAnomalies"], false);
    }

    #[test]
    fn input_defaults() {
        let json = r#"{
            "current": {"spend":1,"impressions":1,"clicks":0,"conversions":0,"ctr":0,"cpc":0,"cpa":0,"roas":0},
            "previous": {"spend":1,"impressions":1,"clicks":0,"conversions":0,"ctr":0,"cpc":0,"cpa":0,"roas":0}
        }"#;
        let input: AnomalyInput = serde_json::from_str(json).unwrap();
        assert!(input.daily_budget.is_none());
        assert!(input.thresholds.is_none());
        assert_eq!(input.hour_of_day, None);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn budget_without_hour_is_rejected() {
        let json = r#"{"current":{"spend":100000},"previous":{"spend":90000},"dailyBudget":100000}"#;
        let input: AnomalyInput = serde_json::from_str(json).unwrap();
        let err = input.validate().unwrap_err();
        assert!(err.to_string().contains("hourOfDay"));

        let json = r#"{"current":{"spend":100000},"previous":{"spend":90000},
            "dailyBudget":100000,"hourOfDay":12}"#;
        let input: AnomalyInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.hour_of_day, Some(12));
        assert!(input.validate().is_ok());
    }
}
