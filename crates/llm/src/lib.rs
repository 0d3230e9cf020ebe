//! LLM access for the analytics engine.
//!
//! [`providers`] holds one [`LlmProvider`] per backend (OpenAI-compatible,
//! Anthropic, Ollama); [`narrative`] turns a provider into the anomaly
//! detector's narrative collaborator.

pub mod narrative;
pub mod provider;
pub mod providers;

pub use narrative::LlmNarrativeGenerator;
pub use provider::{LlmError, LlmProvider, Message, Role};
pub use providers::create_provider;
