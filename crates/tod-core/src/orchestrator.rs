//! Conversation Orchestrator
//!
//! Drives one turn of the conversation:
//!
//! ```text
//! AwaitingInput ─▶ MainTurnPending ─┬─▶ ToolDispatch ─▶ FinalAnswerPending ─┐
//!       ▲                           │                                       │
//!       └───────────────────────────┴───────────── answer ◀─────────────────┘
//! ```
//!
//! The main model sees the tool catalog once per turn. If it asks for tools,
//! each call is dispatched in request order and its result appended before
//! the next one runs; the model then gets one more call, without the
//! catalog, to write the answer.

use std::sync::Arc;

use tracing::Instrument;

use crate::error::{AgentError, Result};
use crate::message::{Conversation, Message};
use crate::provider::{LlmProvider, ModelConfig, ModelSet};
use crate::tool::{ToolCall, ToolRegistry, ToolResult};

/// Persona prompt every conversation starts with
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an AI assistant named Tod. You will concisely answer \
questions, but never make up information unless asked to do so. If you do not know the answer, \
you will say so. You are friendly and warm and have a fatherly tone.";

/// Orchestrator configuration
#[derive(Clone, Debug)]
pub struct OrchestratorConfig {
    /// System prompt seeded into new conversations
    pub system_prompt: String,

    /// Main conversational model
    pub model: ModelConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            model: ModelConfig::main(),
        }
    }
}

/// What a completed turn produced
#[derive(Clone, Debug, Default)]
pub struct TurnOutcome {
    /// Final answer shown to the user
    pub answer: String,

    /// Results of dispatched tool calls, in request order
    pub tool_results: Vec<ToolResult>,

    /// Number of inference calls made by the main model this turn
    pub inference_calls: usize,
}

/// Where a turn currently is. `AwaitingInput` belongs to the caller.
enum TurnStage {
    MainTurnPending,
    ToolDispatch(Vec<ToolCall>),
    FinalAnswerPending,
    Answered(String),
}

/// Owns the main model and the tool catalog; the conversation is lent to it
/// one turn at a time.
pub struct Orchestrator {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            config,
        }
    }

    /// Orchestrator with the default persona and the built-in tools
    pub fn with_defaults(provider: Arc<dyn LlmProvider>, models: &ModelSet) -> Self {
        let tools = ToolRegistry::with_defaults(provider.clone(), models);
        let config = OrchestratorConfig {
            model: models.main.clone(),
            ..OrchestratorConfig::default()
        };
        Self::new(provider, Arc::new(tools), config)
    }

    /// Fresh conversation holding only the system prompt
    pub fn new_conversation(&self) -> Conversation {
        Conversation::with_system_prompt(self.config.system_prompt.clone())
    }

    /// Run one turn for `input`.
    ///
    /// On error the turn is abandoned; everything appended to `conversation`
    /// before the failure stays in place.
    pub async fn turn(&self, conversation: &mut Conversation, input: &str) -> Result<TurnOutcome> {
        let span = tracing::info_span!("turn", conversation = %conversation.id());
        self.run_turn(conversation, input).instrument(span).await
    }

    async fn run_turn(&self, conversation: &mut Conversation, input: &str) -> Result<TurnOutcome> {
        conversation.push(Message::user(input));

        let mut outcome = TurnOutcome::default();
        let mut stage = TurnStage::MainTurnPending;

        loop {
            stage = match stage {
                TurnStage::MainTurnPending => {
                    let catalog = self.tools.schemas();
                    let reply = self
                        .provider
                        .chat(
                            &self.config.model,
                            conversation.messages(),
                            Some(catalog.as_slice()),
                        )
                        .await?;
                    outcome.inference_calls += 1;

                    let calls = reply.tool_calls.clone();
                    let content = reply.content.clone();
                    conversation.push(reply);

                    if calls.is_empty() {
                        TurnStage::Answered(content)
                    } else {
                        TurnStage::ToolDispatch(calls)
                    }
                }
                TurnStage::ToolDispatch(calls) => {
                    for call in &calls {
                        if let Some(result) = self.dispatch(call).await? {
                            conversation.push(Message::tool(&call.name, result.message_content()));
                            outcome.tool_results.push(result);
                        }
                    }
                    TurnStage::FinalAnswerPending
                }
                TurnStage::FinalAnswerPending => {
                    let reply = self
                        .provider
                        .chat(&self.config.model, conversation.messages(), None)
                        .await?;
                    outcome.inference_calls += 1;

                    if reply.has_tool_calls() {
                        tracing::warn!(
                            requested = reply.tool_calls.len(),
                            "Model requested tools after the catalog was withdrawn, ignoring"
                        );
                    }

                    let content = reply.content.clone();
                    conversation.push(reply);
                    TurnStage::Answered(content)
                }
                TurnStage::Answered(answer) => {
                    outcome.answer = answer;
                    return Ok(outcome);
                }
            };
        }
    }

    /// Dispatch a single tool call.
    ///
    /// Unknown tools yield `None` and are skipped. Bad arguments become a
    /// failed result so the model can see what went wrong. Provider errors
    /// from a delegate abort the turn.
    async fn dispatch(&self, call: &ToolCall) -> Result<Option<ToolResult>> {
        tracing::info!(tool = %call.name, "Using tool");

        match self.tools.execute(call).await {
            Ok(result) => Ok(Some(result)),
            Err(AgentError::ToolNotFound(name)) => {
                tracing::warn!(tool = %name, "Model requested an unknown tool, skipping");
                Ok(None)
            }
            Err(AgentError::ToolValidation(reason)) => {
                tracing::warn!(tool = %call.name, %reason, "Rejected tool arguments");
                Ok(Some(ToolResult::failure(&call.name, reason)))
            }
            Err(e) => Err(e),
        }
    }

    /// Get the tool registry
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Get configuration
    pub const fn config(&self) -> &OrchestratorConfig {
        &self.config
    }
}

/// Builder for Orchestrator configuration
pub struct OrchestratorBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: Option<ToolRegistry>,
    models: ModelSet,
    system_prompt: String,
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: None,
            models: ModelSet::default(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
        }
    }

    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Replace the built-in tool catalog
    #[must_use]
    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = Some(tools);
        self
    }

    #[must_use]
    pub fn models(mut self, models: ModelSet) -> Self {
        self.models = models;
        self
    }

    #[must_use]
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn build(self) -> Result<Orchestrator> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        let tools = self
            .tools
            .unwrap_or_else(|| ToolRegistry::with_defaults(provider.clone(), &self.models));

        let config = OrchestratorConfig {
            system_prompt: self.system_prompt,
            model: self.models.main,
        };

        Ok(Orchestrator::new(provider, Arc::new(tools), config))
    }
}
