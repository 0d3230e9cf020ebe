//! Narrative collaborator interface.
//!
//! The detector only decides *when* to ask for a narrative and merges the
//! answer into its result. Producing the narrative (prompting, transport)
//! belongs to an implementation of [`NarrativeGenerator`], injected at
//! construction time.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use adpulse_core::MetricsSnapshot;

use super::DetectedAnomaly;

pub const MAX_TITLE_CHARS: usize = 100;
pub const MAX_SUMMARY_CHARS: usize = 500;
pub const MAX_KEY_FINDINGS: usize = 5;
pub const MAX_RECOMMENDATIONS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum NarrativeError {
    #[error("narrative provider failed: {0}")]
    Provider(String),
    #[error("invalid narrative payload: {0}")]
    Validation(String),
    #[error("narrative generation timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InsightSeverity {
    #[serde(alias = "info")]
    Info,
    #[serde(alias = "warning")]
    Warning,
    #[serde(alias = "critical")]
    Critical,
}

impl fmt::Display for InsightSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InsightSeverity::Info => "INFO",
            InsightSeverity::Warning => "WARNING",
            InsightSeverity::Critical => "CRITICAL",
        })
    }
}

/// One narrated insight, in the fixed schema the collaborator must return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiInsight {
    #[serde(rename = "type")]
    pub insight_type: String,
    pub severity: InsightSeverity,
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub key_findings: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl AiInsight {
    /// Check the schema limits. Lengths are counted in characters.
    pub fn validate(&self) -> Result<(), NarrativeError> {
        if self.title.trim().is_empty() {
            return Err(NarrativeError::Validation("insight title is empty".into()));
        }
        let title_len = self.title.chars().count();
        if title_len > MAX_TITLE_CHARS {
            return Err(NarrativeError::Validation(format!(
                "title has {title_len} chars, max {MAX_TITLE_CHARS}"
            )));
        }
        let summary_len = self.summary.chars().count();
        if summary_len > MAX_SUMMARY_CHARS {
            return Err(NarrativeError::Validation(format!(
                "summary has {summary_len} chars, max {MAX_SUMMARY_CHARS}"
            )));
        }
        if self.key_findings.len() > MAX_KEY_FINDINGS {
            return Err(NarrativeError::Validation(format!(
                "{} key findings, max {MAX_KEY_FINDINGS}",
                self.key_findings.len()
            )));
        }
        if self.recommendations.len() > MAX_RECOMMENDATIONS {
            return Err(NarrativeError::Validation(format!(
                "{} recommendations, max {MAX_RECOMMENDATIONS}",
                self.recommendations.len()
            )));
        }
        Ok(())
    }
}

/// Everything the collaborator gets to work from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeRequest {
    pub account_id: Option<String>,
    pub current: MetricsSnapshot,
    pub previous: MetricsSnapshot,
    pub anomalies: Vec<DetectedAnomaly>,
}

/// Produces narrated insights for a set of rule hits.
///
/// Implementations are called at most once per detection, only when at
/// least one rule fired, and are not retried.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn generate(&self, request: &NarrativeRequest) -> Result<Vec<AiInsight>, NarrativeError>;
}
