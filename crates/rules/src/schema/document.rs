//! Multi-kind rule document container and accessors.

use super::{CommonMetadata, RuleKind};
use crate::benchmark_config::IndustryBenchmarksRule;
use crate::thresholds::AnomalyThresholdsRule;

/// A fully deserialized rule of any supported kind.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleDocument {
    /// Rule-engine trigger levels.
    AnomalyThresholds(AnomalyThresholdsRule),
    /// Reference values for creative scoring.
    IndustryBenchmarks(IndustryBenchmarksRule),
}

impl RuleDocument {
    /// Get the rule's metadata regardless of kind.
    pub fn metadata(&self) -> &CommonMetadata {
        match self {
            RuleDocument::AnomalyThresholds(rule) => &rule.metadata,
            RuleDocument::IndustryBenchmarks(rule) => &rule.metadata,
        }
    }

    /// Get the rule kind.
    pub fn kind(&self) -> RuleKind {
        match self {
            RuleDocument::AnomalyThresholds(_) => RuleKind::AnomalyThresholds,
            RuleDocument::IndustryBenchmarks(_) => RuleKind::IndustryBenchmarks,
        }
    }

    pub fn as_anomaly_thresholds(&self) -> Option<&AnomalyThresholdsRule> {
        match self {
            RuleDocument::AnomalyThresholds(rule) => Some(rule),
            _ => None,
        }
    }

    pub fn as_industry_benchmarks(&self) -> Option<&IndustryBenchmarksRule> {
        match self {
            RuleDocument::IndustryBenchmarks(rule) => Some(rule),
            _ => None,
        }
    }
}
