//! # tod-core
//!
//! Conversation orchestration for Tod, a chat assistant that hands
//! specialist questions to delegate models exposed as tools.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Orchestrator                           │
//! │  ┌─────────────┐  ┌──────────────┐  ┌─────────────────────┐  │
//! │  │ Turn state  │  │    Tools     │  │   LlmProvider       │  │
//! │  │  machine    │──│   Registry   │──│   (Strategy)        │  │
//! │  └─────────────┘  └──────┬───────┘  └─────────────────────┘  │
//! │                          │                                   │
//! │               ┌──────────┴──────────┐                        │
//! │               │ MathDelegate ──▶ Summarizer                  │
//! │               └─────────────────────┘                        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait is the only seam to the inference service, so the
//! whole turn can be driven by [`mock::MockProvider`] in tests.

pub mod delegate;
pub mod error;
pub mod message;
pub mod mock;
pub mod orchestrator;
pub mod provider;
pub mod tool;

pub use delegate::{MathDelegate, Summarizer};
pub use error::{AgentError, Result};
pub use message::{Conversation, Message, Role};
pub use orchestrator::{Orchestrator, OrchestratorBuilder, OrchestratorConfig, TurnOutcome};
pub use provider::{LlmProvider, ModelConfig, ModelSet};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult, ToolSchema};
