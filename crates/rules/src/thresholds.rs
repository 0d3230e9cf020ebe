//! AnomalyThresholds rule kind: trigger levels for the snapshot rule engine.
//!
//! All thresholds are positive percentages. Drop thresholds are compared
//! against the negated value (a CTR change of -20% trips a `ctr_drop` of 20).

use serde::{Deserialize, Serialize};

use crate::schema::CommonMetadata;

pub const DEFAULT_CPA_SPIKE: f64 = 30.0;
pub const DEFAULT_CTR_DROP: f64 = 20.0;
pub const DEFAULT_IMPRESSION_DROP: f64 = 50.0;
pub const DEFAULT_SPEND_VELOCITY: f64 = 150.0;
pub const DEFAULT_ROAS_DROP: f64 = 30.0;

// ── YAML-level types ────────────────────────────────────────────────

/// Top-level AnomalyThresholds rule document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AnomalyThresholdsRule {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: CommonMetadata,
    /// Any subset of thresholds; the rest keep their defaults.
    #[serde(default)]
    pub spec: ThresholdOverrides,
}

/// Partial threshold set. Used both in rule files and as per-call overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdOverrides {
    #[serde(default)]
    pub cpa_spike: Option<f64>,
    #[serde(default)]
    pub ctr_drop: Option<f64>,
    #[serde(default)]
    pub impression_drop: Option<f64>,
    #[serde(default)]
    pub spend_velocity: Option<f64>,
    #[serde(default)]
    pub roas_drop: Option<f64>,
}

// ── Compiled type ───────────────────────────────────────────────────

/// Fully resolved thresholds used by the rule engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnomalyThresholds {
    /// CPA % increase that raises a warning.
    pub cpa_spike: f64,
    /// CTR % decrease that raises a warning.
    pub ctr_drop: f64,
    /// Impression % decrease that raises a critical alert.
    pub impression_drop: f64,
    /// Spend velocity (actual vs. expected pacing, in %) that raises a warning.
    pub spend_velocity: f64,
    /// ROAS % decrease that raises a warning.
    pub roas_drop: f64,
}

impl Default for AnomalyThresholds {
    fn default() -> Self {
        Self {
            cpa_spike: DEFAULT_CPA_SPIKE,
            ctr_drop: DEFAULT_CTR_DROP,
            impression_drop: DEFAULT_IMPRESSION_DROP,
            spend_velocity: DEFAULT_SPEND_VELOCITY,
            roas_drop: DEFAULT_ROAS_DROP,
        }
    }
}

impl AnomalyThresholds {
    /// Apply a partial override on top of these thresholds.
    pub fn with_overrides(mut self, overrides: &ThresholdOverrides) -> Self {
        if let Some(v) = overrides.cpa_spike {
            self.cpa_spike = v;
        }
        if let Some(v) = overrides.ctr_drop {
            self.ctr_drop = v;
        }
        if let Some(v) = overrides.impression_drop {
            self.impression_drop = v;
        }
        if let Some(v) = overrides.spend_velocity {
            self.spend_velocity = v;
        }
        if let Some(v) = overrides.roas_drop {
            self.roas_drop = v;
        }
        self
    }
}

impl AnomalyThresholdsRule {
    /// Resolve the rule against the built-in defaults.
    pub fn compile(&self) -> AnomalyThresholds {
        AnomalyThresholds::default().with_overrides(&self.spec)
    }
}
