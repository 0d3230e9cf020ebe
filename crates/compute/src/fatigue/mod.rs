//! Creative fatigue detection.
//!
//! Turns a per-creative daily metric series into a 0–100 fatigue index,
//! a trend classification, peak / exhaustion estimates and a recommended
//! action. The calculation is stateless: every call works only from the
//! series it is given, and dates are derived from the series itself.
//!
//! Index = CTR decline × 0.35 + CVR decline × 0.30
//!       + frequency increase × 0.20 + age factor × 0.15,
//! each component clamped to [0, 100] before weighting.

mod recommendation;


use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use adpulse_core::DailyMetric;

use crate::stats::{finite_or_zero, linear_slope, mean};

pub use recommendation::{recommend, FatigueAction, FatigueRecommendation, Urgency};

pub const WEIGHT_CTR_DECLINE: f64 = 0.35;
pub const WEIGHT_CVR_DECLINE: f64 = 0.30;
pub const WEIGHT_FREQUENCY_INCREASE: f64 = 0.20;
pub const WEIGHT_CREATIVE_AGE: f64 = 0.15;

/// Fewer points than this produce the "insufficient data" output.
pub const MIN_DATA_POINTS: usize = 3;

/// Number of points at each end of the series used for frequency averages
/// and for the CTR slope.
pub const TREND_WINDOW: usize = 7;

/// Age (days) at which the age factor saturates at 100.
pub const AGE_SATURATION_DAYS: f64 = 30.0;

/// Index at or above which a creative is considered exhausted.
pub const EXHAUSTION_INDEX: u8 = 80;

/// CTR slope (percentage points per day) beyond which the trend is
/// classified as rising / declining.
// TODO: expose the slope band through a rule document once there is
// account data to tune it against.
pub const SLOPE_THRESHOLD: f64 = 0.05;

/// Heuristic conversion of |CTR slope| into fatigue index points per day.
const SLOPE_TO_DAILY_FATIGUE: f64 = 10.0;

/// Exhaustion estimates at or beyond this horizon are discarded.
const MAX_EXHAUSTION_HORIZON_DAYS: f64 = 365.0;

/// Trend classification of a creative's recent delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FatigueTrend {
    Rising,
    Stable,
    Declining,
    Exhausted,
}

/// Components of the fatigue index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FatigueFactorKind {
    CtrDecline,
    CvrDecline,
    FrequencyIncrease,
    CreativeAge,
}

/// One weighted component of the index, kept for explainability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FatigueFactor {
    pub factor: FatigueFactorKind,
    pub weight: f64,
    /// Component value after clamping to [0, 100].
    pub value: f64,
    /// `value × weight`.
    pub contribution: f64,
}

impl FatigueFactor {
    fn new(factor: FatigueFactorKind, weight: f64, raw_value: f64) -> Self {
        let value = finite_or_zero(raw_value).clamp(0.0, 100.0);
        Self {
            factor,
            weight,
            value,
            contribution: value * weight,
        }
    }
}

/// Result of a fatigue calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FatigueOutput {
    /// 0–100; higher means more worn out.
    pub index: u8,
    pub trend: FatigueTrend,
    pub peak_date: Option<NaiveDate>,
    pub peak_ctr: Option<f64>,
    pub current_ctr: Option<f64>,
    pub days_from_peak: Option<i64>,
    pub estimated_exhaustion: Option<NaiveDate>,
    pub factors: Vec<FatigueFactor>,
    pub recommendation: FatigueRecommendation,
}

impl FatigueOutput {
    /// Output for series too short to analyse.
    pub fn insufficient_data() -> Self {
        Self {
            index: 0,
            trend: FatigueTrend::Stable,
            peak_date: None,
            peak_ctr: None,
            current_ctr: None,
            days_from_peak: None,
            estimated_exhaustion: None,
            factors: Vec::new(),
            recommendation: FatigueRecommendation {
                action: FatigueAction::Keep,
                reason: "Insufficient data: at least 3 days of metrics are required".to_string(),
                urgency: Urgency::Low,
            },
        }
    }

    /// The part of the output the creative scorer consumes.
    pub fn summary(&self) -> FatigueSummary {
        FatigueSummary {
            index: self.index,
            trend: self.trend,
        }
    }
}

/// Compact fatigue state passed to the creative scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FatigueSummary {
    pub index: u8,
    pub trend: FatigueTrend,
}

/// Compute the fatigue index for one creative.
///
/// `daily_metrics` may be in any order; it is sorted by date internally.
/// `creative_age_days` is the number of days since the creative launched.
pub fn calculate_fatigue_index(daily_metrics: &[DailyMetric], creative_age_days: u32) -> FatigueOutput {
    if daily_metrics.len() < MIN_DATA_POINTS {
        debug!(points = daily_metrics.len(), "insufficient data for fatigue analysis");
        return FatigueOutput::insufficient_data();
    }

    let mut series: Vec<&DailyMetric> = daily_metrics.iter().collect();
    series.sort_by_key(|m| m.date);

    let ctrs: Vec<f64> = series.iter().map(|m| m.ctr).collect();
    let cvrs: Vec<f64> = series.iter().map(|m| m.cvr).collect();
    let frequencies: Vec<f64> = series.iter().map(|m| m.frequency).collect();

    // Peak / current analysis. The series is non-empty here.
    let (peak_idx, peak_ctr) = peak(&ctrs);
    let current = series[series.len() - 1];
    let current_ctr = current.ctr;
    let peak_date = series[peak_idx].date;
    let days_from_peak = (current.date - peak_date).num_days();

    let ctr_decline = decline_percent(peak_ctr, current_ctr);
    let (_, peak_cvr) = peak(&cvrs);
    let cvr_decline = decline_percent(peak_cvr, current.cvr);

    let frequency_increase = frequency_increase_percent(&frequencies);
    let age_factor = (f64::from(creative_age_days) / AGE_SATURATION_DAYS).min(1.0) * 100.0;

    let factors = vec![
        FatigueFactor::new(FatigueFactorKind::CtrDecline, WEIGHT_CTR_DECLINE, ctr_decline),
        FatigueFactor::new(FatigueFactorKind::CvrDecline, WEIGHT_CVR_DECLINE, cvr_decline),
        FatigueFactor::new(
            FatigueFactorKind::FrequencyIncrease,
            WEIGHT_FREQUENCY_INCREASE,
            frequency_increase,
        ),
        FatigueFactor::new(FatigueFactorKind::CreativeAge, WEIGHT_CREATIVE_AGE, age_factor),
    ];

    let weighted: f64 = factors.iter().map(|f| f.contribution).sum();
    let index = weighted.clamp(0.0, 100.0).round() as u8;

    let recent_ctrs = &ctrs[ctrs.len().saturating_sub(TREND_WINDOW)..];
    let slope = linear_slope(recent_ctrs);
    let trend = classify_trend(index, slope);

    let estimated_exhaustion = estimate_exhaustion(index, trend, slope, current.date);
    let recommendation = recommend(index, trend, days_from_peak);

    debug!(
        points = series.len(),
        index,
        trend = ?trend,
        slope,
        action = ?recommendation.action,
        "fatigue calculated"
    );

    FatigueOutput {
        index,
        trend,
        peak_date: Some(peak_date),
        peak_ctr: Some(peak_ctr),
        current_ctr: Some(current_ctr),
        days_from_peak: Some(days_from_peak),
        estimated_exhaustion,
        factors,
        recommendation,
    }
}

/// Index and value of the first maximum.
fn peak(values: &[f64]) -> (usize, f64) {
    let (idx, value) = values
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, v)| if v > best.1 { (i, v) } else { best });
    (idx, finite_or_zero(value))
}

/// `(peak - current) / peak × 100`, or 0 when the peak is not positive.
fn decline_percent(peak: f64, current: f64) -> f64 {
    if peak <= 0.0 {
        return 0.0;
    }
    finite_or_zero((peak - current) / peak * 100.0)
}

/// Percent increase of the recent-window average frequency over the early window.
fn frequency_increase_percent(frequencies: &[f64]) -> f64 {
    let window = TREND_WINDOW.min(frequencies.len());
    let early = mean(&frequencies[..window]);
    let recent = mean(&frequencies[frequencies.len() - window..]);
    if early == 0.0 {
        return 0.0;
    }
    finite_or_zero((recent - early) / early * 100.0)
}

/// Exhaustion overrides the slope; otherwise the slope decides.
pub fn classify_trend(index: u8, slope: f64) -> FatigueTrend {
    if index >= EXHAUSTION_INDEX {
        FatigueTrend::Exhausted
    } else if slope < -SLOPE_THRESHOLD {
        FatigueTrend::Declining
    } else if slope > SLOPE_THRESHOLD {
        FatigueTrend::Rising
    } else {
        FatigueTrend::Stable
    }
}

/// Project the date the index reaches [`EXHAUSTION_INDEX`] for declining creatives.
fn estimate_exhaustion(
    index: u8,
    trend: FatigueTrend,
    slope: f64,
    as_of: NaiveDate,
) -> Option<NaiveDate> {
    if trend != FatigueTrend::Declining || index >= EXHAUSTION_INDEX || slope == 0.0 {
        return None;
    }

    let daily_increase = slope.abs() * SLOPE_TO_DAILY_FATIGUE;
    let days = f64::from(EXHAUSTION_INDEX - index) / daily_increase;
    if !(days > 0.0 && days < MAX_EXHAUSTION_HORIZON_DAYS) {
        return None;
    }

    as_of.checked_add_days(Days::new(days.ceil() as u64))
}
