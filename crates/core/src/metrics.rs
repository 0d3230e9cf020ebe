//! Metric records supplied by the metrics provider.
//!
//! Field names serialize in camelCase to match the dashboard's wire format.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{check_non_negative, Result};

/// One day of delivery data for a single creative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyMetric {
    pub date: NaiveDate,
    pub impressions: u64,
    /// Click-through rate in percent (1.5 = 1.5%).
    pub ctr: f64,
    /// Conversion rate in percent.
    pub cvr: f64,
    /// Average exposures per user.
    pub frequency: f64,
}

impl DailyMetric {
    pub fn validate(&self) -> Result<()> {
        check_non_negative("ctr", self.ctr)?;
        check_non_negative("cvr", self.cvr)?;
        check_non_negative("frequency", self.frequency)
    }
}

/// Video sub-metrics of a creative with at least one view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoMetrics {
    pub views: u64,
    pub watched_2s: Option<u64>,
    pub watched_6s: Option<u64>,
    /// Average play time in seconds.
    pub avg_play_time: Option<f64>,
}

/// Aggregated performance for one creative over the reporting window.
///
/// Ratios (`ctr`, `cvr`, `cpc`, `cpm`, `cpa`, `roas`) are computed by the
/// caller; the engine never re-derives them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreativeMetrics {
    pub spend: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub ctr: f64,
    pub cvr: f64,
    pub cpc: f64,
    pub cpm: f64,
    pub cpa: f64,
    pub roas: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_views: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_watched_2s: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_watched_6s: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_video_play_time: Option<f64>,
}

impl CreativeMetrics {
    /// The video sub-metrics, or `None` for non-video creatives and videos
    /// without views.
    pub fn video(&self) -> Option<VideoMetrics> {
        let views = self.video_views.filter(|v| *v > 0)?;
        Some(VideoMetrics {
            views,
            watched_2s: self.video_watched_2s,
            watched_6s: self.video_watched_6s,
            avg_play_time: self.avg_video_play_time,
        })
    }

    /// Ratios and spend must be finite and non-negative. Zero is allowed
    /// everywhere (the scorer treats it as "no data").
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("spend", self.spend),
            ("ctr", self.ctr),
            ("cvr", self.cvr),
            ("cpc", self.cpc),
            ("cpm", self.cpm),
            ("cpa", self.cpa),
            ("roas", self.roas),
        ];
        for (field, value) in fields {
            check_non_negative(field, value)?;
        }
        if let Some(play_time) = self.avg_video_play_time {
            check_non_negative("avgVideoPlayTime", play_time)?;
        }
        Ok(())
    }
}

/// Account-level totals for one comparison period. Missing fields read as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetricsSnapshot {
    pub spend: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub ctr: f64,
    pub cpc: f64,
    pub cpa: f64,
    pub roas: f64,
}

/// A dated value of a single metric, used by the time-series detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}
