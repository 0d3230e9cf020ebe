use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{send_json, text_at};
use crate::provider::{LlmError, LlmProvider, Message};

/// OpenAI chat completions, or any server speaking the same protocol
/// (set `OPENAI_BASE_URL`).
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            base_url,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

fn request_body(model: &str, messages: &[Message], temperature: f32, max_tokens: u32) -> Value {
    let turns: Vec<Value> = messages
        .iter()
        .map(|m| json!({ "role": m.role.as_str(), "content": m.content }))
        .collect();

    json!({
        "model": model,
        "messages": turns,
        "temperature": temperature,
        "max_tokens": max_tokens,
        "response_format": { "type": "json_object" },
    })
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let url = self.endpoint();
        let body = request_body(&self.model, &messages, temperature, max_tokens);
        debug!(model = %self.model, %url, "openai request");

        let request = self.client.post(&url).bearer_auth(&self.api_key);
        let reply = send_json(request, &body).await?;

        text_at(&reply, "/choices/0/message/content")
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
