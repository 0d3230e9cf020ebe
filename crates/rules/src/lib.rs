//! YAML rule documents configuring the analytics engine.
//!
//! This crate provides:
//! - `AnomalyThresholds` rules (rule-engine trigger levels)
//! - `IndustryBenchmarks` rules (reference values for creative scoring)
//! - Two-pass (envelope, then concrete kind) deserialization
//! - A filesystem loader that reports per-file load status

pub mod benchmark_config;
pub mod loader;
pub mod schema;
pub mod thresholds;

pub use loader::{LoadResult, LoadStatus, RuleError, RuleLoader};
pub use thresholds::{AnomalyThresholds, ThresholdOverrides};
