//! Mock LLM Provider
//!
//! For testing and demo purposes. Replies are scripted in order, and every
//! request is recorded so tests can assert on what was sent.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{AgentError, Result};
use crate::message::{Message, Role};
use crate::provider::{LlmProvider, ModelConfig, ModelInfo};
use crate::tool::ToolSchema;

type Fallback = Box<dyn Fn(&[Message]) -> String + Send + Sync>;

/// Which provider entry point a request went through
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallKind {
    Chat,
    Complete,
}

/// A request seen by the mock
#[derive(Clone, Debug)]
pub struct RecordedCall {
    pub kind: CallKind,
    pub model: String,
    pub temperature: f32,
    pub system_prompt: Option<String>,
    /// Roles of the messages sent (chat only)
    pub roles: Vec<Role>,
    /// Advertised tool names, `None` when no catalog was sent (chat only)
    pub tools: Option<Vec<String>>,
    /// Prompt text (complete only)
    pub prompt: Option<String>,
}

/// Scripted provider
///
/// Chat replies and completions are consumed from two independent queues.
/// An exhausted chat queue falls back to the configured responder, if any;
/// otherwise the call fails with a provider error.
#[derive(Default)]
pub struct MockProvider {
    chat_replies: Mutex<VecDeque<Result<Message>>>,
    completions: Mutex<VecDeque<Result<String>>>,
    calls: Mutex<Vec<RecordedCall>>,
    fallback: Option<Fallback>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a chat reply
    #[must_use]
    pub fn then_reply(mut self, message: Message) -> Self {
        self.chat_replies.get_mut().push_back(Ok(message));
        self
    }

    /// Queue a chat failure
    #[must_use]
    pub fn then_fail(mut self, error: AgentError) -> Self {
        self.chat_replies.get_mut().push_back(Err(error));
        self
    }

    /// Queue a completion
    #[must_use]
    pub fn then_complete(mut self, text: impl Into<String>) -> Self {
        self.completions.get_mut().push_back(Ok(text.into()));
        self
    }

    /// Queue a completion failure
    #[must_use]
    pub fn then_fail_completion(mut self, error: AgentError) -> Self {
        self.completions.get_mut().push_back(Err(error));
        self
    }

    /// Answer chats from `f` once the scripted replies run out
    #[must_use]
    pub fn with_fallback<F>(mut self, f: F) -> Self
    where
        F: Fn(&[Message]) -> String + Send + Sync + 'static,
    {
        self.fallback = Some(Box::new(f));
        self
    }

    /// Requests received so far, oldest first
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn chat(
        &self,
        config: &ModelConfig,
        messages: &[Message],
        tools: Option<&[ToolSchema]>,
    ) -> Result<Message> {
        self.calls.lock().await.push(RecordedCall {
            kind: CallKind::Chat,
            model: config.model.clone(),
            temperature: config.temperature,
            system_prompt: config.system_prompt.clone(),
            roles: messages.iter().map(|m| m.role).collect(),
            tools: tools.map(|t| t.iter().map(|s| s.name.clone()).collect()),
            prompt: None,
        });

        if let Some(reply) = self.chat_replies.lock().await.pop_front() {
            return reply;
        }

        match &self.fallback {
            Some(f) => Ok(Message::assistant(f(messages))),
            None => Err(AgentError::Provider("mock chat script exhausted".into())),
        }
    }

    async fn complete(&self, config: &ModelConfig, prompt: &str) -> Result<String> {
        self.calls.lock().await.push(RecordedCall {
            kind: CallKind::Complete,
            model: config.model.clone(),
            temperature: config.temperature,
            system_prompt: config.system_prompt.clone(),
            roles: Vec::new(),
            tools: None,
            prompt: Some(prompt.to_string()),
        });

        self.completions
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(AgentError::Provider("mock completion script exhausted".into())))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true) // Mock always healthy
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        Ok(Vec::new())
    }
}
