use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u32(profile: &str, key: &str, default: u32) -> u32 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub analytics: AnalyticsConfig,
    pub llm: LlmConfig,
    pub ollama: OllamaConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `ADPULSE_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("ADPULSE_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            analytics: AnalyticsConfig::from_env_profiled(p),
            llm: LlmConfig::from_env_profiled(p),
            ollama: OllamaConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  analytics:   rules_dir={}, narrative_timeout={}s, batch_concurrency={}",
            self.analytics.rules_dir.display(),
            self.analytics.narrative_timeout_secs,
            self.analytics.batch_concurrency
        );
        tracing::info!("  llm:         provider={}", self.llm.provider);
        tracing::info!("  ollama:      url={}", self.ollama.url);
    }

    /// Return a redacted view safe for printing (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "analytics": {
                "rules_dir": self.analytics.rules_dir,
                "narrative_timeout_secs": self.analytics.narrative_timeout_secs,
                "batch_concurrency": self.analytics.batch_concurrency,
            },
            "llm": {
                "provider": self.llm.provider,
                "configured": self.llm.is_configured(),
                "temperature": self.llm.temperature,
                "max_tokens": self.llm.max_tokens,
            },
            "ollama": { "url": self.ollama.url, "model": self.ollama.model },
        })
    }
}

// ── Analytics engine ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Directory holding threshold / benchmark rule YAML files.
    pub rules_dir: PathBuf,
    /// Upper bound on a single narrative (LLM) call.
    pub narrative_timeout_secs: u64,
    /// Maximum accounts processed at once by the batch fan-out.
    pub batch_concurrency: u32,
}

impl AnalyticsConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            rules_dir: PathBuf::from(profiled_env_or(p, "RULES_DIR", "data/rules")),
            narrative_timeout_secs: profiled_env_u64(p, "NARRATIVE_TIMEOUT_SECS", 30),
            batch_concurrency: profiled_env_u32(p, "BATCH_CONCURRENCY", 4).max(1),
        }
    }
}

// ── LLM (OpenAI / Anthropic) ─────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "openai", "anthropic", "ollama"
    pub provider: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LlmConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            provider: profiled_env_or(p, "LLM_PROVIDER", "ollama"),
            openai_api_key: profiled_env_opt(p, "OPENAI_API_KEY"),
            openai_model: profiled_env_or(p, "OPENAI_MODEL", "gpt-4o"),
            openai_base_url: profiled_env_opt(p, "OPENAI_BASE_URL"),
            anthropic_api_key: profiled_env_opt(p, "ANTHROPIC_API_KEY"),
            anthropic_model: profiled_env_or(p, "ANTHROPIC_MODEL", "claude-sonnet-4-5-20250929"),
            temperature: profiled_env_or(p, "LLM_TEMPERATURE", "0.3")
                .parse()
                .unwrap_or(0.3),
            max_tokens: profiled_env_u32(p, "LLM_MAX_TOKENS", 2048),
        }
    }

    pub fn is_configured(&self) -> bool {
        match self.provider.as_str() {
            "openai" => self.openai_api_key.is_some(),
            "anthropic" | "claude" => self.anthropic_api_key.is_some(),
            "ollama" => true,
            _ => false,
        }
    }
}

// ── Ollama (local models) ─────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub url: String,
    pub model: String,
}

impl OllamaConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            url: profiled_env_or(p, "OLLAMA_URL", "http://localhost:11434"),
            model: profiled_env_or(p, "OLLAMA_MODEL", "llama3.2"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_label_defaults() {
        let config = Config::for_profile("");
        assert_eq!(config.profile_label(), "default");
    }

    #[test]
    fn unknown_provider_is_not_configured() {
        let mut llm = LlmConfig::from_env_profiled("ADPULSE_TEST_UNUSED");
        llm.provider = "bogus".into();
        assert!(!llm.is_configured());
        llm.provider = "ollama".into();
        assert!(llm.is_configured());
    }

    #[test]
    fn redacted_summary_has_no_keys() {
        let mut config = Config::for_profile("");
        config.llm.openai_api_key = Some("sk-secret".into());
        let rendered = config.redacted_summary().to_string();
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("narrative_timeout_secs"));
    }
}
