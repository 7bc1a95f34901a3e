//! Shell Configuration

use tod_core::ModelSet;
use tod_runtime::OllamaConfig;

/// Everything the shell reads from the environment
#[derive(Clone, Debug)]
pub struct Settings {
    /// Where the Ollama server lives
    pub ollama: OllamaConfig,

    /// Main, math and summarizer models
    pub models: ModelSet,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            ollama: OllamaConfig::from_env()?,
            models: ModelSet::from_env()?,
        })
    }
}
