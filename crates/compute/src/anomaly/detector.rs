//! Rule-then-narrative coordinator.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use adpulse_rules::AnomalyThresholds;

use super::narrative::{AiInsight, NarrativeError, NarrativeGenerator, NarrativeRequest};
use super::rules::detect_anomalies_rule_based;
use super::{AnomalyDetectionResult, AnomalyInput, DetectedAnomaly};

pub const DEFAULT_NARRATIVE_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs the rule engine and escalates to the narrative collaborator only
/// when a rule fired.
///
/// A failing or slow collaborator never fails detection: the rule-based
/// anomalies are returned with an empty insight list.
pub struct AnomalyDetector {
    narrative: Option<Arc<dyn NarrativeGenerator>>,
    thresholds: AnomalyThresholds,
    timeout: Duration,
}

impl AnomalyDetector {
    pub fn new(narrative: Arc<dyn NarrativeGenerator>) -> Self {
        Self {
            narrative: Some(narrative),
            thresholds: AnomalyThresholds::default(),
            timeout: DEFAULT_NARRATIVE_TIMEOUT,
        }
    }

    /// A detector that never escalates.
    pub fn rules_only() -> Self {
        Self {
            narrative: None,
            thresholds: AnomalyThresholds::default(),
            timeout: DEFAULT_NARRATIVE_TIMEOUT,
        }
    }

    pub fn with_thresholds(mut self, thresholds: AnomalyThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn thresholds(&self) -> &AnomalyThresholds {
        &self.thresholds
    }

    pub fn has_narrative(&self) -> bool {
        self.narrative.is_some()
    }

    pub async fn detect(&self, input: &AnomalyInput) -> AnomalyDetectionResult {
        let thresholds = match &input.thresholds {
            Some(overrides) => self.thresholds.with_overrides(overrides),
            None => self.thresholds,
        };

        let anomalies = detect_anomalies_rule_based(input, &thresholds);
        if anomalies.is_empty() {
            debug!(account_id = input.account_id.as_deref().unwrap_or("-"), "no rule hits");
            return AnomalyDetectionResult::new(anomalies, Vec::new());
        }

        let insights = match &self.narrative {
            Some(narrative) => self.escalate(narrative.as_ref(), input, &anomalies).await,
            None => Vec::new(),
        };

        AnomalyDetectionResult::new(anomalies, insights)
    }

    async fn escalate(
        &self,
        narrative: &dyn NarrativeGenerator,
        input: &AnomalyInput,
        anomalies: &[DetectedAnomaly],
    ) -> Vec<AiInsight> {
        let account_id = input.account_id.as_deref().unwrap_or("-");
        info!(account_id, hits = anomalies.len(), "escalating rule hits for narrative");

        let request = NarrativeRequest {
            account_id: input.account_id.clone(),
            current: input.current.clone(),
            previous: input.previous.clone(),
            anomalies: anomalies.to_vec(),
        };

        let outcome = match tokio::time::timeout(self.timeout, narrative.generate(&request)).await {
            Ok(result) => result,
            Err(_) => Err(NarrativeError::Timeout(self.timeout)),
        };

        match outcome.and_then(validated) {
            Ok(insights) => {
                debug!(account_id, insights = insights.len(), "narrative received");
                insights
            }
            Err(e) => {
                warn!(account_id, error = %e, "narrative generation failed, returning rule-based anomalies only");
                Vec::new()
            }
        }
    }
}

fn validated(insights: Vec<AiInsight>) -> Result<Vec<AiInsight>, NarrativeError> {
    for insight in &insights {
        insight.validate()?;
    }
    Ok(insights)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use adpulse_core::MetricsSnapshot;
    use adpulse_rules::ThresholdOverrides;

    use super::*;
    use crate::anomaly::{AnomalySeverity, AnomalyType, InsightSeverity, OverallSeverity};

    enum Behavior {
        Respond(InsightSeverity),
        Fail,
        Hang,
        Invalid,
    }

    struct StubNarrative {
        calls: AtomicUsize,
        behavior: Behavior,
    }

    impl StubNarrative {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                behavior,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    fn insight(severity: InsightSeverity, title: &str) -> AiInsight {
        AiInsight {
            insight_type: "ANOMALY".into(),
            severity,
            title: title.into(),
            summary: "Cost per acquisition climbed while volume held.".into(),
            key_findings: vec!["CVR fell".into()],
            recommendations: vec!["Refresh creatives".into()],
        }
    }

    #[async_trait]
    impl NarrativeGenerator for StubNarrative {
        async fn generate(&self, request: &NarrativeRequest) -> Result<Vec<AiInsight>, NarrativeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(!request.anomalies.is_empty());
            match self.behavior {
                Behavior::Respond(severity) => Ok(vec![insight(severity, "CPA spike")]),
                Behavior::Fail => Err(NarrativeError::Provider("upstream 500".into())),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(Vec::new())
                }
                Behavior::Invalid => Ok(vec![insight(InsightSeverity::Info, "")]),
            }
        }
    }

    fn snapshot(cpa: f64) -> MetricsSnapshot {
        MetricsSnapshot {
            spend: 50_000.0,
            impressions: 40_000,
            clicks: 400,
            conversions: 5,
            ctr: 1.0,
            cpc: 125.0,
            cpa,
            roas: 2.0,
        }
    }

    fn input(current_cpa: f64) -> AnomalyInput {
        AnomalyInput {
            account_id: Some("acct-1".into()),
            current: snapshot(current_cpa),
            previous: snapshot(10_000.0),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn no_hits_never_calls_narrative() {
        let stub = StubNarrative::new(Behavior::Respond(InsightSeverity::Critical));
        let detector = AnomalyDetector::new(stub.clone());

        let result = detector.detect(&input(10_000.0)).await;

        assert_eq!(stub.calls(), 0);
        assert!(!result.has_anomalies);
        assert!(result.rule_based_anomalies.is_empty());
        assert!(result.ai_insights.is_empty());
        assert_eq!(result.overall_severity, OverallSeverity::None);
    }

    #[tokio::test]
    async fn hit_escalates_once_and_merges() {
        let stub = StubNarrative::new(Behavior::Respond(InsightSeverity::Warning));
        let detector = AnomalyDetector::new(stub.clone());

        let result = detector.detect(&input(13_000.0)).await;

        assert_eq!(stub.calls(), 1);
        assert!(result.has_anomalies);
        assert_eq!(result.rule_based_anomalies.len(), 1);
        assert_eq!(result.rule_based_anomalies[0].anomaly_type, AnomalyType::CpaSpike);
        assert_eq!(result.ai_insights.len(), 1);
        assert_eq!(result.overall_severity, OverallSeverity::Warning);
    }

    #[tokio::test]
    async fn critical_insight_raises_overall_severity() {
        let stub = StubNarrative::new(Behavior::Respond(InsightSeverity::Critical));
        let detector = AnomalyDetector::new(stub.clone());

        let result = detector.detect(&input(13_000.0)).await;

        assert_eq!(result.rule_based_anomalies[0].severity, AnomalySeverity::Warning);
        assert_eq!(result.overall_severity, OverallSeverity::Critical);
    }

    #[tokio::test]
    async fn provider_failure_degrades_to_rules() {
        let stub = StubNarrative::new(Behavior::Fail);
        let detector = AnomalyDetector::new(stub.clone());

        let result = detector.detect(&input(16_000.0)).await;

        assert_eq!(stub.calls(), 1);
        assert_eq!(result.rule_based_anomalies.len(), 1);
        assert!(result.ai_insights.is_empty());
        assert_eq!(result.overall_severity, OverallSeverity::Critical);
    }

    #[tokio::test]
    async fn invalid_payload_degrades_to_rules() {
        let stub = StubNarrative::new(Behavior::Invalid);
        let detector = AnomalyDetector::new(stub.clone());

        let result = detector.detect(&input(13_000.0)).await;

        assert_eq!(stub.calls(), 1);
        assert!(result.ai_insights.is_empty());
        assert_eq!(result.overall_severity, OverallSeverity::Warning);
    }

    #[tokio::test]
    async fn slow_narrative_times_out() {
        let stub = StubNarrative::new(Behavior::Hang);
        let detector = AnomalyDetector::new(stub.clone()).with_timeout(Duration::from_millis(50));

        let result = detector.detect(&input(13_000.0)).await;

        assert_eq!(stub.calls(), 1);
        assert!(result.has_anomalies);
        assert!(result.ai_insights.is_empty());
    }

    #[tokio::test]
    async fn per_call_overrides_apply() {
        let detector = AnomalyDetector::rules_only();
        let mut i = input(12_000.0);
        assert!(!detector.detect(&i).await.has_anomalies);

        i.thresholds = Some(ThresholdOverrides {
            cpa_spike: Some(15.0),
            ..Default::default()
        });
        let result = detector.detect(&i).await;
        assert!(result.has_anomalies);
        assert_eq!(result.rule_based_anomalies[0].threshold, 15.0);
        assert_eq!(detector.thresholds().cpa_spike, 30.0);
    }

    #[tokio::test]
    async fn rules_only_detector_skips_escalation() {
        let detector = AnomalyDetector::rules_only().with_thresholds(AnomalyThresholds {
            cpa_spike: 50.0,
            ..AnomalyThresholds::default()
        });
        assert!(!detector.has_narrative());

        let result = detector.detect(&input(16_000.0)).await;
        assert_eq!(result.rule_based_anomalies[0].severity, AnomalySeverity::Warning);
        assert!(result.ai_insights.is_empty());
    }

    #[tokio::test]
    async fn repeated_detection_is_identical() {
        let detector = AnomalyDetector::rules_only();
        let a = serde_json::to_string(&detector.detect(&input(16_000.0)).await).unwrap();
        let b = serde_json::to_string(&detector.detect(&input(16_000.0)).await).unwrap();
        assert_eq!(a, b);
    }
}
