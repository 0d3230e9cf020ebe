//! Integration tests that verify every bundled YAML rule in `data/rules/`
//! loads cleanly and resolves to the documented defaults.

use adpulse_core::{BenchmarkProvider, IndustryBenchmarks};
use adpulse_rules::schema::RuleKind;
use adpulse_rules::{AnomalyThresholds, LoadStatus, RuleLoader};

/// Integration tests run from the crate directory, so we go up two levels.
fn rules_dir() -> std::path::PathBuf {
    let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest.join("../../data/rules")
}

#[test]
fn every_bundled_rule_loads() {
    let loader = RuleLoader::new(rules_dir());
    let results = loader.load_all().expect("scan bundled rules");

    for result in &results {
        if let LoadStatus::Failed { error } = &result.status {
            panic!("{} failed to load: {}", result.path.display(), error);
        }
    }

    let kinds: Vec<RuleKind> = loader.documents().iter().map(|d| d.kind()).collect();
    assert!(kinds.contains(&RuleKind::AnomalyThresholds));
    assert!(kinds.contains(&RuleKind::IndustryBenchmarks));
}

#[test]
fn bundled_rules_match_builtin_defaults() {
    let loader = RuleLoader::new(rules_dir());
    loader.load_all().expect("scan bundled rules");

    assert_eq!(loader.thresholds(), AnomalyThresholds::default());
    assert_eq!(loader.benchmarks(), IndustryBenchmarks::default());
}
