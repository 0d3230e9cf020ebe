//! Multi-factor creative scoring.
//!
//! Every raw metric is normalized against its benchmark with a piecewise
//! linear curve (see [`normalize_score`]), combined into four category
//! scores, then into a 0–100 overall score and a letter grade.
//!
//! | category       | weight | inputs                                    |
//! |----------------|--------|-------------------------------------------|
//! | efficiency     | 0.35   | CTR 0.30, CVR 0.40, CPA (inverse) 0.30    |
//! | scale          | 0.25   | impressions 0.40, conversions 0.60        |
//! | sustainability | 0.25   | 100 − fatigue index (70 when unknown)     |
//! | engagement     | 0.15   | 6s watch rate 0.60, avg play time 0.40    |

mod ranking;
mod summary;

#[cfg(test)]
mod tests;

use std::fmt;

use serde::{Deserialize, Serialize};

use adpulse_core::{CreativeMetrics, IndustryBenchmarks};

use crate::fatigue::FatigueSummary;

pub use ranking::{bottom_creatives, score_creatives, top_creatives};
pub use summary::{creatives_summary, AverageBreakdown, CreativesSummary, GradeDistribution};

pub const WEIGHT_EFFICIENCY: f64 = 0.35;
pub const WEIGHT_SCALE: f64 = 0.25;
pub const WEIGHT_SUSTAINABILITY: f64 = 0.25;
pub const WEIGHT_ENGAGEMENT: f64 = 0.15;

/// Sustainability when no fatigue data is available.
pub const DEFAULT_SUSTAINABILITY: f64 = 70.0;
/// Engagement for non-video creatives or videos without views.
pub const DEFAULT_ENGAGEMENT: f64 = 50.0;
/// Score used for a metric whose benchmark is zero, or a missing video sub-metric.
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Categories below this are named as weak points in the recommendation.
const WEAK_POINT_THRESHOLD: u8 = 50;

/// (ratio, score) breakpoints, descending. Scores are interpolated linearly
/// between neighbours; ratios at or above the first breakpoint score 100.
const CURVE: [(f64, f64); 9] = [
    (2.0, 100.0),
    (1.5, 85.0),
    (1.2, 75.0),
    (1.0, 65.0),
    (0.8, 55.0),
    (0.6, 45.0),
    (0.4, 35.0),
    (0.2, 20.0),
    (0.0, 0.0),
];

/// Map a metric to 0–100 relative to its benchmark.
///
/// `inverse` is for lower-is-better metrics (CPA): the ratio becomes
/// `benchmark / value`. A zero benchmark scores a neutral 50; a NaN,
/// infinite or negative ratio scores 0.
pub fn normalize_score(value: f64, benchmark: f64, inverse: bool) -> f64 {
    if benchmark == 0.0 {
        return NEUTRAL_SCORE;
    }

    let ratio = if inverse { benchmark / value } else { value / benchmark };
    if !ratio.is_finite() || ratio < 0.0 {
        return 0.0;
    }

    if ratio >= CURVE[0].0 {
        return CURVE[0].1;
    }

    for pair in CURVE.windows(2) {
        let (hi_ratio, hi_score) = pair[0];
        let (lo_ratio, lo_score) = pair[1];
        if ratio >= lo_ratio {
            return lo_score + (ratio - lo_ratio) / (hi_ratio - lo_ratio) * (hi_score - lo_score);
        }
    }

    0.0
}

/// Letter grade derived from the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    S,
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_score(overall: u8) -> Self {
        match overall {
            90.. => Grade::S,
            80..=89 => Grade::A,
            70..=79 => Grade::B,
            60..=69 => Grade::C,
            50..=59 => Grade::D,
            _ => Grade::F,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Grade::S => "S",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        f.write_str(s)
    }
}

/// Per-category scores, each 0–100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub efficiency: u8,
    pub scale: u8,
    pub sustainability: u8,
    pub engagement: u8,
}

impl CategoryBreakdown {
    fn named(&self) -> [(&'static str, u8); 4] {
        [
            ("efficiency", self.efficiency),
            ("scale", self.scale),
            ("sustainability", self.sustainability),
            ("engagement", self.engagement),
        ]
    }

    /// Names of categories scoring below 50.
    pub fn weak_points(&self) -> Vec<&'static str> {
        self.named()
            .into_iter()
            .filter(|(_, v)| *v < WEAK_POINT_THRESHOLD)
            .map(|(name, _)| name)
            .collect()
    }
}

/// A creative to be scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreativeInput {
    pub id: String,
    pub metrics: CreativeMetrics,
    #[serde(default)]
    pub fatigue: Option<FatigueSummary>,
}

/// Score for one creative.
///
/// `rank` and `percentile` are population-relative and stay 0 until the
/// creative is scored as part of a batch via [`score_creatives`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreativeScore {
    pub overall: u8,
    pub breakdown: CategoryBreakdown,
    pub rank: u32,
    pub percentile: u8,
    pub grade: Grade,
    pub recommendation: String,
}

/// Score a single creative. Rank and percentile are left at 0.
pub fn score_creative(creative: &CreativeInput, benchmarks: &IndustryBenchmarks) -> CreativeScore {
    let metrics = &creative.metrics;

    let breakdown = CategoryBreakdown {
        efficiency: to_score(efficiency_score(metrics, benchmarks)),
        scale: to_score(scale_score(metrics, benchmarks)),
        sustainability: to_score(sustainability_score(creative.fatigue.as_ref())),
        engagement: to_score(engagement_score(metrics, benchmarks)),
    };

    let weighted = f64::from(breakdown.efficiency) * WEIGHT_EFFICIENCY
        + f64::from(breakdown.scale) * WEIGHT_SCALE
        + f64::from(breakdown.sustainability) * WEIGHT_SUSTAINABILITY
        + f64::from(breakdown.engagement) * WEIGHT_ENGAGEMENT;
    let overall = to_score(weighted);

    CreativeScore {
        overall,
        breakdown,
        rank: 0,
        percentile: 0,
        grade: Grade::from_score(overall),
        recommendation: recommendation_text(overall, &breakdown),
    }
}

fn efficiency_score(m: &CreativeMetrics, b: &IndustryBenchmarks) -> f64 {
    normalize_score(m.ctr, b.ctr, false) * 0.30
        + normalize_score(m.cvr, b.cvr, false) * 0.40
        + normalize_score(m.cpa, b.cpa, true) * 0.30
}

fn scale_score(m: &CreativeMetrics, b: &IndustryBenchmarks) -> f64 {
    normalize_score(m.impressions as f64, b.avg_impressions, false) * 0.40
        + normalize_score(m.conversions as f64, b.avg_conversions, false) * 0.60
}

fn sustainability_score(fatigue: Option<&FatigueSummary>) -> f64 {
    match fatigue {
        Some(f) => 100.0 - f64::from(f.index.min(100)),
        None => DEFAULT_SUSTAINABILITY,
    }
}

fn engagement_score(m: &CreativeMetrics, b: &IndustryBenchmarks) -> f64 {
    let Some(video) = m.video() else {
        return DEFAULT_ENGAGEMENT;
    };

    let watch_rate = match video.watched_6s {
        Some(watched) => (watched as f64 / video.views as f64 * 100.0).clamp(0.0, 100.0),
        None => NEUTRAL_SCORE,
    };
    let play_time = match video.avg_play_time {
        Some(seconds) => normalize_score(seconds, b.avg_video_play_time, false),
        None => NEUTRAL_SCORE,
    };

    watch_rate * 0.60 + play_time * 0.40
}

fn recommendation_text(overall: u8, breakdown: &CategoryBreakdown) -> String {
    let weak = breakdown.weak_points();
    match overall {
        80.. => "Top performer: increase budget and reuse its hook and format in new variations."
            .to_string(),
        60..=79 if weak.is_empty() => {
            "Solid performance: keep running and test variations to push it further.".to_string()
        }
        60..=79 => format!("Solid performance; improve weak points: {}.", weak.join(", ")),
        40..=59 if weak.is_empty() => {
            "Below-average performance: refine targeting and refresh the creative.".to_string()
        }
        40..=59 => format!(
            "Below-average performance; weak points: {}. Fix these before scaling.",
            weak.join(", ")
        ),
        _ => "Underperforming: pause this creative and move budget to stronger performers."
            .to_string(),
    }
}

/// Clamp to [0, 100] and round; non-finite values become 0.
fn to_score(value: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    value.clamp(0.0, 100.0).round() as u8
}
