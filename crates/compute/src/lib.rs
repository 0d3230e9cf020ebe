//! Creative performance analytics engine.
//!
//! - [`fatigue`]: creative fatigue / degradation index from a daily series
//! - [`scoring`]: multi-factor composite score, grades and population ranking
//! - [`anomaly`]: snapshot rule engine, time-series detector and the
//!   rule-then-narrative escalation coordinator
//! - [`batch`]: bounded per-account fan-out with per-account outcomes
//!
//! The calculators are synchronous and stateless. The only suspending point
//! is the narrative call made by [`AnomalyDetector`].

pub mod anomaly;
pub mod batch;
pub mod fatigue;
pub mod scoring;
pub mod stats;

pub use anomaly::{
    detect_anomalies_rule_based, detect_trend_anomalies, format_anomaly_report, AiInsight,
    AnomalyDetectionResult, AnomalyDetector, AnomalyInput, AnomalySeverity, AnomalyType,
    DetectedAnomaly, InsightSeverity, NarrativeError, NarrativeGenerator, NarrativeRequest,
    OverallSeverity,
};
pub use batch::{run_account_batch, AccountOutcome, AccountStatus, BatchReport};
pub use fatigue::{calculate_fatigue_index, FatigueOutput, FatigueSummary, FatigueTrend};
pub use scoring::{
    bottom_creatives, creatives_summary, score_creative, score_creatives, top_creatives,
    CreativeInput, CreativeScore, CreativesSummary, Grade,
};
