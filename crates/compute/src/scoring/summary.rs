//! Population statistics over a set of creative scores.

use serde::{Deserialize, Serialize};

use super::{CreativeScore, Grade};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeDistribution {
    pub s: usize,
    pub a: usize,
    pub b: usize,
    pub c: usize,
    pub d: usize,
    pub f: usize,
}

impl GradeDistribution {
    fn record(&mut self, grade: Grade) {
        match grade {
            Grade::S => self.s += 1,
            Grade::A => self.a += 1,
            Grade::B => self.b += 1,
            Grade::C => self.c += 1,
            Grade::D => self.d += 1,
            Grade::F => self.f += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AverageBreakdown {
    pub efficiency: f64,
    pub scale: f64,
    pub sustainability: f64,
    pub engagement: f64,
}

/// Summary of a scored population. Every field is zero for an empty population.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreativesSummary {
    pub total: usize,
    pub average_score: f64,
    pub grade_distribution: GradeDistribution,
    /// Creatives graded S or A.
    pub top_performers: usize,
    /// Creatives graded D or F.
    pub underperformers: usize,
    pub average_breakdown: AverageBreakdown,
}

pub fn creatives_summary<'a, I>(scores: I) -> CreativesSummary
where
    I: IntoIterator<Item = &'a CreativeScore>,
{
    let mut summary = CreativesSummary::default();
    let mut overall_sum = 0.0;
    let mut sums = AverageBreakdown::default();

    for score in scores {
        summary.total += 1;
        overall_sum += f64::from(score.overall);
        summary.grade_distribution.record(score.grade);
        sums.efficiency += f64::from(score.breakdown.efficiency);
        sums.scale += f64::from(score.breakdown.scale);
        sums.sustainability += f64::from(score.breakdown.sustainability);
        sums.engagement += f64::from(score.breakdown.engagement);
    }

    if summary.total == 0 {
        return summary;
    }

    let n = summary.total as f64;
    summary.average_score = overall_sum / n;
    summary.average_breakdown = AverageBreakdown {
        efficiency: sums.efficiency / n,
        scale: sums.scale / n,
        sustainability: sums.sustainability / n,
        engagement: sums.engagement / n,
    };
    let dist = &summary.grade_distribution;
    summary.top_performers = dist.s + dist.a;
    summary.underperformers = dist.d + dist.f;

    summary
}
