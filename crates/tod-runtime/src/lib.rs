//! # tod-runtime
//!
//! Runtime providers for tod.
//!
//! ## Providers
//!
//! - **Ollama** (default): Local LLM inference via Ollama
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tod_runtime::OllamaProvider;
//!
//! let provider = OllamaProvider::from_env()?;
//! let orchestrator = OrchestratorBuilder::new()
//!     .provider(Arc::new(provider))
//!     .build()?;
//! ```

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "ollama")]
pub use ollama::{OllamaConfig, OllamaProvider};

// Re-export core types for convenience
pub use tod_core::{
    AgentError, LlmProvider, Message, ModelConfig, ModelSet, Orchestrator, Result, Role,
    ToolRegistry,
};
