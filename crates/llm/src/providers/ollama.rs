use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{send_json, text_at};
use crate::provider::{LlmError, LlmProvider, Message};

/// Local models served by Ollama's `/api/chat`.
pub struct OllamaProvider {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl OllamaProvider {
    pub fn new(url: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            model,
        }
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
        "stream": false,
        "format": "json",
        "options": {
            "temperature": temperature,
            "num_predict": max_tokens,
        },
    })
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let url = format!("{}/api/chat", self.url);
        let body = request_body(&self.model, &messages, temperature, max_tokens);
        debug!(model = %self.model, %url, "ollama request");

        let reply = send_json(self.client.post(&url), &body).await?;
        text_at(&reply, "/message/content")
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}
