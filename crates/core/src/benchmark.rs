//! Industry / account reference values used to normalize raw metrics.

use serde::{Deserialize, Serialize};

pub const DEFAULT_BENCHMARK_CTR: f64 = 1.0;
pub const DEFAULT_BENCHMARK_CVR: f64 = 2.0;
pub const DEFAULT_BENCHMARK_CPA: f64 = 10_000.0;
pub const DEFAULT_BENCHMARK_IMPRESSIONS: f64 = 50_000.0;
pub const DEFAULT_BENCHMARK_CONVERSIONS: f64 = 100.0;
pub const DEFAULT_BENCHMARK_VIDEO_PLAY_TIME: f64 = 8.0;

/// Per-metric reference values. All are expected to be positive; a zero
/// benchmark makes the scorer fall back to a neutral score for that metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryBenchmarks {
    /// CTR in percent.
    pub ctr: f64,
    /// CVR in percent.
    pub cvr: f64,
    pub cpa: f64,
    pub avg_impressions: f64,
    pub avg_conversions: f64,
    /// Seconds.
    pub avg_video_play_time: f64,
}

impl Default for IndustryBenchmarks {
    fn default() -> Self {
        Self {
            ctr: DEFAULT_BENCHMARK_CTR,
            cvr: DEFAULT_BENCHMARK_CVR,
            cpa: DEFAULT_BENCHMARK_CPA,
            avg_impressions: DEFAULT_BENCHMARK_IMPRESSIONS,
            avg_conversions: DEFAULT_BENCHMARK_CONVERSIONS,
            avg_video_play_time: DEFAULT_BENCHMARK_VIDEO_PLAY_TIME,
        }
    }
}

impl IndustryBenchmarks {
    /// Apply a partial override on top of these values.
    pub fn with_overrides(mut self, overrides: &BenchmarkOverrides) -> Self {
        if let Some(v) = overrides.ctr {
            self.ctr = v;
        }
        if let Some(v) = overrides.cvr {
            self.cvr = v;
        }
        if let Some(v) = overrides.cpa {
            self.cpa = v;
        }
        if let Some(v) = overrides.avg_impressions {
            self.avg_impressions = v;
        }
        if let Some(v) = overrides.avg_conversions {
            self.avg_conversions = v;
        }
        if let Some(v) = overrides.avg_video_play_time {
            self.avg_video_play_time = v;
        }
        self
    }

    /// Names of benchmarks that are zero, negative or non-finite.
    pub fn degenerate_fields(&self) -> Vec<&'static str> {
        [
            ("ctr", self.ctr),
            ("cvr", self.cvr),
            ("cpa", self.cpa),
            ("avgImpressions", self.avg_impressions),
            ("avgConversions", self.avg_conversions),
            ("avgVideoPlayTime", self.avg_video_play_time),
        ]
        .into_iter()
        .filter(|(_, v)| !v.is_finite() || *v <= 0.0)
        .map(|(name, _)| name)
        .collect()
    }
}

/// Partial benchmark set; unspecified fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BenchmarkOverrides {
    #[serde(default)]
    pub ctr: Option<f64>,
    #[serde(default)]
    pub cvr: Option<f64>,
    #[serde(default)]
    pub cpa: Option<f64>,
    #[serde(default)]
    pub avg_impressions: Option<f64>,
    #[serde(default)]
    pub avg_conversions: Option<f64>,
    #[serde(default)]
    pub avg_video_play_time: Option<f64>,
}

/// Source of benchmark values (static defaults, rule files, account history).
pub trait BenchmarkProvider {
    fn benchmarks(&self) -> IndustryBenchmarks;
}

impl BenchmarkProvider for IndustryBenchmarks {
    fn benchmarks(&self) -> IndustryBenchmarks {
        *self
    }
}
