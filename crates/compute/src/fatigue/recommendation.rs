//! Recommended action for a given fatigue state.

use serde::{Deserialize, Serialize};

use super::FatigueTrend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FatigueAction {
    Keep,
    Monitor,
    PrepareReplacement,
    Replace,
    UrgentReplace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FatigueRecommendation {
    pub action: FatigueAction,
    pub reason: String,
    pub urgency: Urgency,
}

/// First matching rule wins:
///
/// | condition                         | action               | urgency  |
/// |-----------------------------------|----------------------|----------|
/// | index ≥ 80 or trend = EXHAUSTED   | URGENT_REPLACE       | CRITICAL |
/// | index ≥ 70                        | REPLACE              | HIGH     |
/// | index ≥ 60 or trend = DECLINING   | PREPARE_REPLACEMENT  | MEDIUM   |
/// | index ≥ 40 or > 14 days from peak | MONITOR              | LOW      |
/// | otherwise                         | KEEP                 | LOW      |
pub fn recommend(index: u8, trend: FatigueTrend, days_from_peak: i64) -> FatigueRecommendation {
    let (action, urgency, reason) = if index >= 80 || trend == FatigueTrend::Exhausted {
        (
            FatigueAction::UrgentReplace,
            Urgency::Critical,
            format!("Fatigue index {index} indicates the creative is exhausted; replace it now"),
        )
    } else if index >= 70 {
        (
            FatigueAction::Replace,
            Urgency::High,
            format!("Fatigue index {index} is high; swap in a fresh creative"),
        )
    } else if index >= 60 || trend == FatigueTrend::Declining {
        let cause = if index >= 60 {
            format!("fatigue index {index} is elevated")
        } else {
            "CTR is trending down".to_string()
        };
        (
            FatigueAction::PrepareReplacement,
            Urgency::Medium,
            format!("Performance is degrading ({cause}); prepare a replacement"),
        )
    } else if index >= 40 || days_from_peak > 14 {
        let cause = if index >= 40 {
            format!("fatigue index {index}")
        } else {
            format!("{days_from_peak} days since peak CTR")
        };
        (
            FatigueAction::Monitor,
            Urgency::Low,
            format!("Early signs of fatigue ({cause}); keep monitoring"),
        )
    } else {
        (
            FatigueAction::Keep,
            Urgency::Low,
            "Creative is performing within healthy bounds".to_string(),
        )
    };

    FatigueRecommendation {
        action,
        reason,
        urgency,
    }
}
