//! IndustryBenchmarks rule kind: reference values for creative scoring.

use serde::{Deserialize, Serialize};

use adpulse_core::{BenchmarkOverrides, IndustryBenchmarks};

use crate::schema::CommonMetadata;

/// Top-level IndustryBenchmarks rule document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct IndustryBenchmarksRule {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: CommonMetadata,
    /// Any subset of benchmarks; the rest keep their defaults.
    #[serde(default)]
    pub spec: BenchmarkOverrides,
}

impl IndustryBenchmarksRule {
    /// Resolve the rule against the built-in defaults.
    pub fn compile(&self) -> IndustryBenchmarks {
        IndustryBenchmarks::default().with_overrides(&self.spec)
    }
}
