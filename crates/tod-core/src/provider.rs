//! LLM Provider Strategy Pattern
//!
//! Defines the interface to the inference service. The orchestrator and the
//! delegates work exclusively through [`LlmProvider`], so any backend (Ollama
//! in production, a scripted mock in tests) can sit behind it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tod_core::provider::{LlmProvider, ModelConfig};
//!
//! let provider = OllamaProvider::from_env()?;
//! let reply = provider.chat(&ModelConfig::main(), messages, Some(&catalog)).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};
use crate::message::Message;
use crate::tool::ToolSchema;

/// Conversational model used for the main chat and for summaries
pub const MAIN_MODEL: &str = "mistral-nemo:latest";

/// Model specialised in step-by-step mathematical reasoning
pub const MATH_MODEL: &str = "wizard-math:13b-fp16";

/// Sampling temperature of the main conversational model
pub const MAIN_TEMPERATURE: f32 = 0.2;

/// Model selection and sampling settings for one caller
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model identifier (e.g., "mistral-nemo:latest")
    pub model: String,

    /// Temperature for sampling (0.0 = deterministic)
    pub temperature: f32,

    /// System instruction for single-shot completions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl ModelConfig {
    pub fn new(model: impl Into<String>, temperature: f32) -> Self {
        Self {
            model: model.into(),
            temperature,
            system_prompt: None,
        }
    }

    /// The main conversational model
    pub fn main() -> Self {
        Self::new(MAIN_MODEL, MAIN_TEMPERATURE)
    }

    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }
}

/// The three model configurations a session runs with
#[derive(Clone, Debug, PartialEq)]
pub struct ModelSet {
    /// Main chat model, sees the tool catalog
    pub main: ModelConfig,
    /// Math delegate, deterministic
    pub math: ModelConfig,
    /// Summarizer, deterministic, same model as `main`
    pub summarizer: ModelConfig,
}

impl Default for ModelSet {
    fn default() -> Self {
        Self::with_models(MAIN_MODEL, MATH_MODEL, MAIN_TEMPERATURE)
    }
}

impl ModelSet {
    pub fn with_models(main: &str, math: &str, temperature: f32) -> Self {
        Self {
            main: ModelConfig::new(main, temperature),
            math: ModelConfig::new(math, 0.0),
            summarizer: ModelConfig::new(main, 0.0),
        }
    }

    /// Read `TOD_MAIN_MODEL`, `TOD_MATH_MODEL` and `TOD_TEMPERATURE`,
    /// falling back to the built-in defaults.
    pub fn from_env() -> Result<Self> {
        let main = std::env::var("TOD_MAIN_MODEL").unwrap_or_else(|_| MAIN_MODEL.into());
        let math = std::env::var("TOD_MATH_MODEL").unwrap_or_else(|_| MATH_MODEL.into());
        let temperature = match std::env::var("TOD_TEMPERATURE") {
            Ok(raw) => parse_temperature(&raw)?,
            Err(_) => MAIN_TEMPERATURE,
        };

        Ok(Self::with_models(&main, &math, temperature))
    }
}

fn parse_temperature(raw: &str) -> Result<f32> {
    let value: f32 = raw
        .trim()
        .parse()
        .map_err(|e| AgentError::Config(format!("TOD_TEMPERATURE '{raw}': {e}")))?;

    if !(0.0..=2.0).contains(&value) {
        return Err(AgentError::Config(format!(
            "TOD_TEMPERATURE must be between 0.0 and 2.0, got {value}"
        )));
    }
    Ok(value)
}

/// Information about a model
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model tag as Ollama lists it, e.g. `mistral-nemo:latest`
    pub name: String,
}

/// Strategy trait for LLM providers
///
/// Calls are never retried here; a failure is returned to the caller, which
/// decides whether the turn is lost.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send the full history (and optionally a tool catalog) and return the
    /// single assistant message the model answered with.
    async fn chat(
        &self,
        config: &ModelConfig,
        messages: &[Message],
        tools: Option<&[ToolSchema]>,
    ) -> Result<Message>;

    /// Single-shot, history-free generation. `config.system_prompt` is sent
    /// as the system instruction when present.
    async fn complete(&self, config: &ModelConfig, prompt: &str) -> Result<String>;

    /// Check if the provider is available and configured correctly
    async fn health_check(&self) -> Result<bool>;

    /// List available models
    async fn list_models(&self) -> Result<Vec<ModelInfo>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_set_defaults() {
        let models = ModelSet::default();
        assert_eq!(models.main.model, "mistral-nemo:latest");
        assert!(models.main.temperature > 0.0);
        assert_eq!(models.math.model, "wizard-math:13b-fp16");
        assert_eq!(models.math.temperature, 0.0);
        assert_eq!(models.summarizer.model, models.main.model);
        assert_eq!(models.summarizer.temperature, 0.0);
    }

    #[test]
    fn test_parse_temperature() {
        assert_eq!(parse_temperature(" 0.5 ").unwrap(), 0.5);
        assert!(matches!(parse_temperature("warm"), Err(AgentError::Config(_))));
        assert!(matches!(parse_temperature("3.5"), Err(AgentError::Config(_))));
    }

    #[test]
    fn test_model_info_is_just_the_tag() {
        let info: ModelInfo = serde_json::from_str(r#"{"name": "mistral-nemo:latest"}"#).unwrap();
        assert_eq!(info.name, "mistral-nemo:latest");
        assert_eq!(
            serde_json::to_value(&info).unwrap(),
            serde_json::json!({"name": "mistral-nemo:latest"})
        );
    }
}
