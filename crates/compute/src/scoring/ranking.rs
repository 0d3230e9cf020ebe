//! Population scoring: independent per-creative scores, then a single
//! sort-and-rank pass once every score is known.

use std::collections::HashSet;
use std::time::Instant;

use indexmap::IndexMap;
use rayon::prelude::*;
use tracing::{info, warn};

use adpulse_core::IndustryBenchmarks;

use super::{score_creative, CreativeInput, CreativeScore};

/// Score a population and assign rank / percentile.
///
/// Scores are computed in parallel; ranking happens after all of them are
/// known. The returned map is ordered by rank (best first). Ties keep input
/// order. `percentile = round((total - position) / total × 100)`, so rank 1
/// of N gets 100 and the last gets `round(100 / N)`.
///
/// IDs are expected to be unique; a repeated id keeps its first entry in
/// input order and later ones are dropped with a warning.
pub fn score_creatives(
    creatives: &[CreativeInput],
    benchmarks: &IndustryBenchmarks,
) -> IndexMap<String, CreativeScore> {
    let start = Instant::now();

    let mut seen = HashSet::with_capacity(creatives.len());
    let unique: Vec<&CreativeInput> = creatives
        .iter()
        .filter(|&c| {
            let first = seen.insert(c.id.as_str());
            if !first {
                warn!(creative_id = %c.id, "duplicate creative id in batch, keeping the first entry");
            }
            first
        })
        .collect();

    let mut scored: Vec<(&str, CreativeScore)> = unique
        .par_iter()
        .map(|&c| (c.id.as_str(), score_creative(c, benchmarks)))
        .collect();

    scored.sort_by(|a, b| b.1.overall.cmp(&a.1.overall));

    let total = scored.len();
    let ranked: IndexMap<String, CreativeScore> = scored
        .into_iter()
        .enumerate()
        .map(|(position, (id, mut score))| {
            score.rank = (position + 1) as u32;
            score.percentile = percentile(position, total);
            (id.to_string(), score)
        })
        .collect();

    info!(
        creatives = ranked.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "batch scoring completed"
    );

    ranked
}

fn percentile(position: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((total - position) as f64 / total as f64 * 100.0).round() as u8
}

/// The `n` highest-scoring creatives, best first.
///
/// Re-sorts by overall score and ignores any stored rank.
pub fn top_creatives(
    scores: &IndexMap<String, CreativeScore>,
    n: usize,
) -> Vec<(&str, &CreativeScore)> {
    let mut entries: Vec<(&str, &CreativeScore)> =
        scores.iter().map(|(id, s)| (id.as_str(), s)).collect();
    entries.sort_by(|a, b| b.1.overall.cmp(&a.1.overall));
    entries.truncate(n);
    entries
}

/// The `n` lowest-scoring creatives, worst first.
pub fn bottom_creatives(
    scores: &IndexMap<String, CreativeScore>,
    n: usize,
) -> Vec<(&str, &CreativeScore)> {
    let mut entries: Vec<(&str, &CreativeScore)> =
        scores.iter().map(|(id, s)| (id.as_str(), s)).collect();
    entries.sort_by(|a, b| a.1.overall.cmp(&b.1.overall));
    entries.truncate(n);
    entries
}
