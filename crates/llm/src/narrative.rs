//! LLM-backed narrative collaborator for the anomaly detector.
//!
//! One request per escalation, no retries. The reply must be a JSON object
//! `{"insights": [...]}`; anything that fails to decode or breaks the
//! insight schema limits is a [`NarrativeError::Validation`].

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use adpulse_compute::{AiInsight, NarrativeError, NarrativeGenerator, NarrativeRequest};
use adpulse_core::config::{LlmConfig, OllamaConfig};

use crate::provider::{LlmError, LlmProvider, Message};
use crate::providers::create_provider;

const SYSTEM_PROMPT: &str = "You are a performance-marketing analyst reviewing TikTok ad account \
anomalies. Reply with a single JSON object of the form \
{\"insights\": [{\"type\": string, \"severity\": \"INFO\"|\"WARNING\"|\"CRITICAL\", \
\"title\": string (max 100 chars), \"summary\": string (max 500 chars), \
\"keyFindings\": [string] (max 5), \"recommendations\": [string] (max 3)}]}. \
No prose outside the JSON.";

#[derive(Debug, Deserialize)]
struct InsightEnvelope {
    insights: Vec<AiInsight>,
}

pub struct LlmNarrativeGenerator {
    provider: Box<dyn LlmProvider>,
    temperature: f32,
    max_tokens: u32,
}

impl LlmNarrativeGenerator {
    pub fn new(provider: Box<dyn LlmProvider>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            provider,
            temperature,
            max_tokens,
        }
    }

    /// Build from config, creating the configured provider.
    pub fn from_config(llm_config: &LlmConfig, ollama_config: &OllamaConfig) -> Result<Self, LlmError> {
        let provider = create_provider(llm_config, ollama_config)?;
        info!(provider = provider.name(), "narrative generator ready");
        Ok(Self::new(provider, llm_config.temperature, llm_config.max_tokens))
    }

    fn messages(request: &NarrativeRequest) -> Result<Vec<Message>, NarrativeError> {
        let payload = serde_json::to_string_pretty(request)
            .map_err(|e| NarrativeError::Validation(format!("failed to encode request: {e}")))?;
        let account = request.account_id.as_deref().unwrap_or("unknown");
        Ok(vec![
            Message::system(SYSTEM_PROMPT),
            Message::user(format!(
                "Account {account} tripped {} anomaly rule(s). Current vs. previous period \
                 and the rule hits:\n\n{payload}\n\nExplain what likely happened and what to do.",
                request.anomalies.len()
            )),
        ])
    }
}

#[async_trait]
impl NarrativeGenerator for LlmNarrativeGenerator {
    async fn generate(&self, request: &NarrativeRequest) -> Result<Vec<AiInsight>, NarrativeError> {
        let messages = Self::messages(request)?;
        let response = self
            .provider
            .complete(messages, self.temperature, self.max_tokens)
            .await
            .map_err(|e| NarrativeError::Provider(format!("{}: {e}", self.provider.name())))?;

        debug!(provider = self.provider.name(), chars = response.len(), "narrative response");
        parse_insights(&response)
    }
}

/// Decode and validate a narrative reply.
pub fn parse_insights(response: &str) -> Result<Vec<AiInsight>, NarrativeError> {
    let envelope: InsightEnvelope = serde_json::from_str(extract_json(response))
        .map_err(|e| NarrativeError::Validation(format!("malformed insight payload: {e}")))?;

    for insight in &envelope.insights {
        insight.validate()?;
    }
    Ok(envelope.insights)
}

/// Extract the JSON object from a reply that may wrap it in a fenced code
/// block or surround it with prose.
pub fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();

    if let Some(start) = trimmed.find("```") {
        let after_fence = &trimmed[start + 3..];
        // Skip an optional language tag on the opening fence line.
        let content_start = after_fence.find('\n').map_or(0, |n| n + 1);
        if let Some(end) = after_fence[content_start..].find("```") {
            return after_fence[content_start..content_start + end].trim();
        }
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}
