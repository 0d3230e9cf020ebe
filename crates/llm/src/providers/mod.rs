pub mod claude;
pub mod ollama;
pub mod openai;

use serde_json::Value;

use adpulse_core::config::{LlmConfig, OllamaConfig};

use crate::provider::{LlmError, LlmProvider};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Create the provider selected by `llm_config.provider`.
pub fn create_provider(
    llm_config: &LlmConfig,
    ollama_config: &OllamaConfig,
) -> Result<Box<dyn LlmProvider>, LlmError> {
    match llm_config.provider.as_str() {
        "openai" => {
            let api_key = llm_config
                .openai_api_key
                .as_ref()
                .ok_or_else(|| LlmError::NotConfigured("OPENAI_API_KEY not set".into()))?;
            let base_url = llm_config
                .openai_base_url
                .as_deref()
                .unwrap_or(DEFAULT_OPENAI_BASE_URL);
            Ok(Box::new(openai::OpenAiProvider::new(
                api_key.clone(),
                llm_config.openai_model.clone(),
                base_url.trim_end_matches('/').to_string(),
            )))
        }
        "anthropic" | "claude" => {
            let api_key = llm_config
                .anthropic_api_key
                .as_ref()
                .ok_or_else(|| LlmError::NotConfigured("ANTHROPIC_API_KEY not set".into()))?;
            Ok(Box::new(claude::ClaudeProvider::new(
                api_key.clone(),
                llm_config.anthropic_model.clone(),
            )))
        }
        "ollama" => Ok(Box::new(ollama::OllamaProvider::new(
            ollama_config.url.trim_end_matches('/').to_string(),
            ollama_config.model.clone(),
        ))),
        other => Err(LlmError::NotConfigured(format!(
            "unknown LLM provider: '{}'",
            other
        ))),
    }
}

/// Send a JSON request and decode the JSON reply, mapping non-2xx
/// statuses to [`LlmError::Api`].
pub(crate) async fn send_json(request: reqwest::RequestBuilder, body: &Value) -> Result<Value, LlmError> {
    let response = request
        .header("Content-Type", "application/json")
        .json(body)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(LlmError::Api {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.json().await?)
}

/// Pull a string out of a reply by JSON pointer.
pub(crate) fn text_at(reply: &Value, pointer: &str) -> Result<String, LlmError> {
    reply
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| LlmError::Parse(format!("missing {pointer}")))
}
