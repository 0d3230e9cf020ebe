use adpulse_core::{CreativeMetrics, IndustryBenchmarks};

use super::*;
use crate::fatigue::FatigueTrend;

fn creative(id: &str, ctr: f64, cvr: f64, cpa: f64, impressions: u64, conversions: u64) -> CreativeInput {
    CreativeInput {
        id: id.to_string(),
        metrics: CreativeMetrics {
            spend: cpa * conversions as f64,
            impressions,
            clicks: (impressions as f64 * ctr / 100.0) as u64,
            conversions,
            ctr,
            cvr,
            cpc: 0.0,
            cpm: 0.0,
            cpa,
            roas: 0.0,
            ..Default::default()
        },
        fatigue: None,
    }
}

fn with_fatigue(mut c: CreativeInput, index: u8) -> CreativeInput {
    c.fatigue = Some(FatigueSummary {
        index,
        trend: FatigueTrend::Stable,
    });
    c
}

/// Exactly at every benchmark, no video, no fatigue data.
fn at_benchmark() -> CreativeInput {
    creative("at-benchmark", 1.0, 2.0, 10_000.0, 50_000, 100)
}

fn star() -> CreativeInput {
    let mut c = with_fatigue(creative("star", 2.0, 4.0, 5_000.0, 100_000, 200), 10);
    c.metrics.video_views = Some(1_000);
    c.metrics.video_watched_2s = Some(950);
    c.metrics.video_watched_6s = Some(800);
    c.metrics.avg_video_play_time = Some(16.0);
    c
}

fn poor() -> CreativeInput {
    with_fatigue(creative("poor", 0.2, 0.4, 50_000.0, 10_000, 20), 90)
}

fn small_scale() -> CreativeInput {
    creative("small-scale", 0.9, 1.5, 12_000.0, 20_000, 40)
}

// ── normalize_score ─────────────────────────────────────────

#[test]
fn normalize_at_benchmark_is_65() {
    assert_eq!(normalize_score(1.0, 1.0, false), 65.0);
    assert_eq!(normalize_score(10_000.0, 10_000.0, true), 65.0);
    assert_eq!(normalize_score(50_000.0, 50_000.0, false), 65.0);
}

#[test]
fn normalize_curve_endpoints() {
    assert_eq!(normalize_score(2.0, 1.0, false), 100.0);
    assert_eq!(normalize_score(7.0, 1.0, false), 100.0);
    assert_eq!(normalize_score(0.0, 1.0, false), 0.0);
}

#[test]
fn normalize_breakpoints() {
    let cases = [
        (1.5, 85.0),
        (1.2, 75.0),
        (0.8, 55.0),
        (0.6, 45.0),
        (0.4, 35.0),
        (0.2, 20.0),
    ];
    for (ratio, expected) in cases {
        let got = normalize_score(ratio * 100.0, 100.0, false);
        assert!((got - expected).abs() < 1e-9, "ratio {ratio}: {got} != {expected}");
    }
}

#[test]
fn normalize_interpolates_between_breakpoints() {
    assert!((normalize_score(1.35, 1.0, false) - 80.0).abs() < 1e-9);
    assert!((normalize_score(0.1, 1.0, false) - 10.0).abs() < 1e-9);
    // CPA twice the benchmark: ratio 0.5.
    assert!((normalize_score(20_000.0, 10_000.0, true) - 40.0).abs() < 1e-9);
}

#[test]
fn normalize_degenerate_inputs() {
    assert_eq!(normalize_score(3.0, 0.0, false), NEUTRAL_SCORE);
    assert_eq!(normalize_score(3.0, 0.0, true), NEUTRAL_SCORE);
    // Inverse with a zero value is an infinite ratio.
    assert_eq!(normalize_score(0.0, 10.0, true), 0.0);
    assert_eq!(normalize_score(-1.0, 1.0, false), 0.0);
    assert_eq!(normalize_score(f64::NAN, 1.0, false), 0.0);
}

// ── grades ───────────────────────────────────────────────────

#[test]
fn grade_bands() {
    assert_eq!(Grade::from_score(100), Grade::S);
    assert_eq!(Grade::from_score(90), Grade::S);
    assert_eq!(Grade::from_score(89), Grade::A);
    assert_eq!(Grade::from_score(80), Grade::A);
    assert_eq!(Grade::from_score(79), Grade::B);
    assert_eq!(Grade::from_score(70), Grade::B);
    assert_eq!(Grade::from_score(60), Grade::C);
    assert_eq!(Grade::from_score(50), Grade::D);
    assert_eq!(Grade::from_score(49), Grade::F);
    assert_eq!(Grade::from_score(0), Grade::F);
}

// ── score_creative ───────────────────────────────────────────

#[test]
fn benchmark_creative_scores_defaults() {
    let score = score_creative(&at_benchmark(), &IndustryBenchmarks::default());
    assert_eq!(
        score.breakdown,
        CategoryBreakdown {
            efficiency: 65,
            scale: 65,
            sustainability: 70,
            engagement: 50,
        }
    );
    // 65×0.35 + 65×0.25 + 70×0.25 + 50×0.15 = 64
    assert_eq!(score.overall, 64);
    assert_eq!(score.grade, Grade::C);
    assert_eq!(score.rank, 0);
    assert_eq!(score.percentile, 0);
    assert!(score.recommendation.starts_with("Solid performance:"));
}

#[test]
fn star_creative_with_video() {
    let score = score_creative(&star(), &IndustryBenchmarks::default());
    assert_eq!(score.breakdown.efficiency, 100);
    assert_eq!(score.breakdown.scale, 100);
    assert_eq!(score.breakdown.sustainability, 90);
    // 80% six-second watch rate × 0.6 + play time at 2× benchmark × 0.4
    assert_eq!(score.breakdown.engagement, 88);
    assert_eq!(score.overall, 96);
    assert_eq!(score.grade, Grade::S);
    assert!(score.recommendation.starts_with("Top performer"));
}

#[test]
fn poor_creative_gets_fixed_low_tier_text() {
    let score = score_creative(&poor(), &IndustryBenchmarks::default());
    assert_eq!(score.breakdown.efficiency, 20);
    assert_eq!(score.breakdown.sustainability, 10);
    assert_eq!(score.overall, 22);
    assert_eq!(score.grade, Grade::F);
    assert!(score.recommendation.starts_with("Underperforming"));
    assert!(!score.recommendation.contains("weak points"));
}

#[test]
fn middle_tier_names_weak_points() {
    let score = score_creative(&small_scale(), &IndustryBenchmarks::default());
    assert_eq!(score.breakdown.scale, 35);
    assert_eq!(score.overall, 53);
    assert_eq!(score.grade, Grade::D);
    assert!(score.recommendation.contains("weak points: scale."));
    assert!(!score.recommendation.contains("efficiency"));
}

#[test]
fn zero_cpa_and_conversions_are_finite() {
    let score = score_creative(
        &creative("no-conv", 1.0, 2.0, 0.0, 50_000, 0),
        &IndustryBenchmarks::default(),
    );
    assert_eq!(score.breakdown.efficiency, 46);
    assert_eq!(score.breakdown.scale, 26);
    assert_eq!(score.overall, 48);
    assert!(score.recommendation.contains("efficiency, scale"));
}

#[test]
fn video_without_sub_metrics_is_neutral() {
    let mut c = at_benchmark();
    c.metrics.video_views = Some(2_000);
    let score = score_creative(&c, &IndustryBenchmarks::default());
    assert_eq!(score.breakdown.engagement, 50);

    c.metrics.video_views = Some(0);
    let score = score_creative(&c, &IndustryBenchmarks::default());
    assert_eq!(score.breakdown.engagement, DEFAULT_ENGAGEMENT as u8);
}

#[test]
fn video_fields_decoded_from_json_drive_engagement() {
    let metrics: CreativeMetrics = serde_json::from_str(
        r#"{"spend":1000000,"impressions":50000,"clicks":500,"conversions":100,
            "ctr":1.0,"cvr":2.0,"cpc":2000,"cpm":20000,"cpa":10000,"roas":2.0,
            "videoViews":1000,"videoWatched6s":900,"avgVideoPlayTime":16.0}"#,
    )
    .unwrap();
    let c = CreativeInput {
        id: "video".into(),
        metrics,
        fatigue: None,
    };
    // 90% watch rate × 0.6 + play time at 2× benchmark × 0.4
    let score = score_creative(&c, &IndustryBenchmarks::default());
    assert_eq!(score.breakdown.engagement, 94);
}

#[test]
fn zero_benchmarks_score_neutral() {
    let benchmarks = IndustryBenchmarks {
        ctr: 0.0,
        cvr: 0.0,
        cpa: 0.0,
        avg_impressions: 0.0,
        avg_conversions: 0.0,
        avg_video_play_time: 0.0,
    };
    let score = score_creative(&star(), &benchmarks);
    assert_eq!(score.breakdown.efficiency, 50);
    assert_eq!(score.breakdown.scale, 50);
}

#[test]
fn scores_stay_in_range() {
    let mut c = creative("extreme", 1e9, 1e9, 1e-9, u64::MAX, u64::MAX);
    c.fatigue = Some(FatigueSummary {
        index: 255,
        trend: FatigueTrend::Exhausted,
    });
    let score = score_creative(&c, &IndustryBenchmarks::default());
    assert!(score.overall <= 100);
    assert_eq!(score.breakdown.sustainability, 0);
}

#[test]
fn scoring_is_idempotent() {
    let b = IndustryBenchmarks::default();
    assert_eq!(score_creative(&star(), &b), score_creative(&star(), &b));
}

// ── batch ranking ────────────────────────────────────────────

fn population() -> Vec<CreativeInput> {
    vec![at_benchmark(), poor(), star(), small_scale()]
}

#[test]
fn batch_assigns_rank_and_percentile() {
    let ranked = score_creatives(&population(), &IndustryBenchmarks::default());
    let ids: Vec<&str> = ranked.keys().map(String::as_str).collect();
    assert_eq!(ids, vec!["star", "at-benchmark", "small-scale", "poor"]);

    let best = &ranked["star"];
    assert_eq!(best.rank, 1);
    assert_eq!(best.percentile, 100);

    assert_eq!(ranked["at-benchmark"].rank, 2);
    assert_eq!(ranked["at-benchmark"].percentile, 75);

    let worst = &ranked["poor"];
    assert_eq!(worst.rank, 4);
    assert_eq!(worst.percentile, 25);
}

#[test]
fn batch_scores_match_single_scores() {
    let b = IndustryBenchmarks::default();
    let ranked = score_creatives(&population(), &b);
    let single = score_creative(&small_scale(), &b);
    assert_eq!(ranked["small-scale"].overall, single.overall);
    assert_eq!(ranked["small-scale"].breakdown, single.breakdown);
}

#[test]
fn batch_ties_keep_input_order() {
    let mut twin = at_benchmark();
    twin.id = "twin".to_string();
    let ranked = score_creatives(&[at_benchmark(), twin], &IndustryBenchmarks::default());
    assert_eq!(ranked["at-benchmark"].rank, 1);
    assert_eq!(ranked["twin"].rank, 2);
}

#[test]
fn batch_drops_duplicate_ids() {
    let ranked = score_creatives(&[star(), star(), poor()], &IndustryBenchmarks::default());
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked["poor"].percentile, 50);
}

#[test]
fn duplicate_id_keeps_first_entry_not_best() {
    let mut weak = poor();
    weak.id = "dup".into();
    let mut strong = star();
    strong.id = "dup".into();
    let first_score = score_creative(&weak, &IndustryBenchmarks::default()).overall;

    let ranked = score_creatives(&[weak, strong], &IndustryBenchmarks::default());
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked["dup"].overall, first_score);
    assert_eq!(ranked["dup"].overall, 22);
}

#[test]
fn empty_batch() {
    assert!(score_creatives(&[], &IndustryBenchmarks::default()).is_empty());
}

#[test]
fn top_and_bottom_slices() {
    let ranked = score_creatives(&population(), &IndustryBenchmarks::default());

    let top: Vec<&str> = top_creatives(&ranked, 2).into_iter().map(|(id, _)| id).collect();
    assert_eq!(top, vec!["star", "at-benchmark"]);

    let bottom: Vec<&str> = bottom_creatives(&ranked, 2).into_iter().map(|(id, _)| id).collect();
    assert_eq!(bottom, vec!["poor", "small-scale"]);

    assert_eq!(top_creatives(&ranked, 10).len(), 4);
}

#[test]
fn top_slice_ignores_stored_rank() {
    let mut ranked = score_creatives(&population(), &IndustryBenchmarks::default());
    if let Some(poor) = ranked.get_mut("poor") {
        poor.rank = 1;
    }
    let top = top_creatives(&ranked, 1);
    assert_eq!(top[0].0, "star");
}

// ── summary ──────────────────────────────────────────────────

#[test]
fn summary_of_empty_population_is_zero() {
    let summary = creatives_summary(std::iter::empty());
    assert_eq!(summary, CreativesSummary::default());
    assert_eq!(summary.total, 0);
    assert_eq!(summary.average_score, 0.0);
    assert_eq!(summary.top_performers, 0);
    assert_eq!(summary.average_breakdown.engagement, 0.0);
}

#[test]
fn summary_of_population() {
    let ranked = score_creatives(&population(), &IndustryBenchmarks::default());
    let summary = creatives_summary(ranked.values());

    assert_eq!(summary.total, 4);
    // (96 + 64 + 53 + 22) / 4
    assert!((summary.average_score - 58.75).abs() < 1e-10);
    assert_eq!(summary.grade_distribution.s, 1);
    assert_eq!(summary.grade_distribution.c, 1);
    assert_eq!(summary.grade_distribution.d, 1);
    assert_eq!(summary.grade_distribution.f, 1);
    assert_eq!(summary.top_performers, 1);
    assert_eq!(summary.underperformers, 2);
    // (100 + 65 + 56 + 20) / 4
    assert!((summary.average_breakdown.efficiency - 60.25).abs() < 1e-10);
}
