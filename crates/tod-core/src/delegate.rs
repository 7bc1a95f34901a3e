//! Delegate Models
//!
//! Specialist models invoked mid-turn. Neither delegate sees the
//! conversation; each receives only the text it works on.

use std::sync::Arc;

use crate::error::Result;
use crate::message::Message;
use crate::provider::{LlmProvider, ModelConfig};

/// Instruction given to the summarizer
pub const SUMMARIZER_PROMPT: &str = "You will summarize text as concisely and correctly as you can, \
and not say anything else. Remove any typesetting or markup commands (such as LaTeX) \
and write the result as plain text.";

/// Instruction given to the math model
pub const MATH_PROMPT: &str = "You are a careful mathematician. Solve the question step by step, \
showing your reasoning. Do not make up facts or skip steps. State the final result clearly.";

/// Condenses arbitrary text into a short, faithful synopsis
#[derive(Clone)]
pub struct Summarizer {
    provider: Arc<dyn LlmProvider>,
    config: ModelConfig,
}

impl Summarizer {
    /// `config` should use temperature 0.0 so identical input gives identical output.
    pub const fn new(provider: Arc<dyn LlmProvider>, config: ModelConfig) -> Self {
        Self { provider, config }
    }

    pub async fn summarize(&self, text: &str) -> Result<String> {
        let messages = [Message::system(SUMMARIZER_PROMPT), Message::user(text)];

        let reply = self.provider.chat(&self.config, &messages, None).await?;
        Ok(reply.content.trim().to_string())
    }
}

/// Solves mathematical or logical questions step by step
#[derive(Clone)]
pub struct MathDelegate {
    provider: Arc<dyn LlmProvider>,
    config: ModelConfig,
}

impl MathDelegate {
    /// Installs [`MATH_PROMPT`] unless `config` already carries an instruction.
    pub fn new(provider: Arc<dyn LlmProvider>, config: ModelConfig) -> Self {
        let config = if config.system_prompt.is_some() {
            config
        } else {
            config.with_system_prompt(MATH_PROMPT)
        };
        Self { provider, config }
    }

    /// Returns the raw derivation. Callers summarize it before showing it
    /// to anyone.
    pub async fn solve(&self, question: &str) -> Result<String> {
        self.provider.complete(&self.config, question).await
    }
}
