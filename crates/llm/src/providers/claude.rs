use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{send_json, text_at};
use crate::provider::{LlmError, LlmProvider, Message, Role};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Anthropic Messages API.
pub struct ClaudeProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl ClaudeProvider {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        }
    }
}

/// The Messages API takes the system prompt as a top-level field, not as a
/// conversation turn.
fn request_body(model: &str, messages: &[Message], temperature: f32, max_tokens: u32) -> Value {
    let system: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();

    let turns: Vec<Value> = messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| json!({ "role": m.role.as_str(), "content": m.content }))
        .collect();

    let mut body = json!({
        "model": model,
        "messages": turns,
        "temperature": temperature,
        "max_tokens": max_tokens,
    });
    if !system.is_empty() {
        body["system"] = json!(system.join("\n\n"));
    }
    body
}

#[async_trait]
impl LlmProvider for ClaudeProvider {
    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let body = request_body(&self.model, &messages, temperature, max_tokens);
        debug!(model = %self.model, turns = messages.len(), "anthropic request");

        let request = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION);
        let reply = send_json(request, &body).await?;

        text_at(&reply, "/content/0/text")
    }

    fn name(&self) -> &'static str {
        "anthropic"
    }
}
