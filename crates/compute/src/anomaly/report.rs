//! Plain-text rendering of a detection result.

use std::fmt::Write;

use super::{AnomalyDetectionResult, DetectedAnomaly};

/// Render a detection result as a human-readable report.
pub fn format_anomaly_report(result: &AnomalyDetectionResult) -> String {
    if !result.has_anomalies {
        return "No anomalies detected.".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Anomaly report: {} ({} rule-based, {} AI insight{})",
        result.overall_severity,
        result.rule_based_anomalies.len(),
        result.ai_insights.len(),
        if result.ai_insights.len() == 1 { "" } else { "s" },
    );

    out.push_str("\nRule-based anomalies:\n");
    for anomaly in &result.rule_based_anomalies {
        let _ = writeln!(out, "  {}", anomaly_line(anomaly));
    }

    if !result.ai_insights.is_empty() {
        out.push_str("\nAI insights:\n");
        for insight in &result.ai_insights {
            let _ = writeln!(out, "  [{}] {}", insight.severity, insight.title);
            if !insight.summary.is_empty() {
                let _ = writeln!(out, "    {}", insight.summary);
            }
            for finding in &insight.key_findings {
                let _ = writeln!(out, "    - {finding}");
            }
            for rec in &insight.recommendations {
                let _ = writeln!(out, "    > {rec}");
            }
        }
    }

    out.trim_end().to_string()
}

fn anomaly_line(a: &DetectedAnomaly) -> String {
    format!(
        "[{}] {} {}: {:+.1}% (threshold {}) {}",
        a.severity, a.anomaly_type, a.metric, a.change_percent, a.threshold, a.message
    )
}
