//! Ollama LLM Provider
//!
//! Implementation of `LlmProvider` for local Ollama inference. Chat and
//! generation go straight to the HTTP API so the tool catalog reaches the
//! server in exactly the function-calling shape it expects; model listing
//! goes through `ollama-rs`.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use ollama_rs::Ollama;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tod_core::{
    error::{AgentError, Result},
    message::{Message, Role},
    provider::{LlmProvider, ModelConfig, ModelInfo},
    tool::{ToolCall, ToolSchema},
};

/// Ollama provider configuration
#[derive(Clone, Debug)]
pub struct OllamaConfig {
    /// Ollama host URL
    pub host: String,

    /// Ollama port
    pub port: u16,

    /// Request timeout in seconds. Local models can take minutes on a
    /// long derivation.
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost".into(),
            port: 11434,
            timeout_secs: 600,
        }
    }
}

impl OllamaConfig {
    /// Read `OLLAMA_HOST`, `OLLAMA_PORT` and `OLLAMA_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let host = std::env::var("OLLAMA_HOST").unwrap_or(defaults.host);
        let port = match std::env::var("OLLAMA_PORT") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|e| AgentError::Config(format!("OLLAMA_PORT '{raw}': {e}")))?,
            Err(_) => defaults.port,
        };
        let timeout_secs = match std::env::var("OLLAMA_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|e| AgentError::Config(format!("OLLAMA_TIMEOUT_SECS '{raw}': {e}")))?,
            Err(_) => defaults.timeout_secs,
        };

        Ok(Self {
            host,
            port,
            timeout_secs,
        })
    }

    /// `host:port` without a trailing slash
    pub fn base_url(&self) -> String {
        format!("{}:{}", self.host.trim_end_matches('/'), self.port)
    }
}

/// Ollama LLM provider
pub struct OllamaProvider {
    client: Ollama,
    http: reqwest::Client,
    config: OllamaConfig,
}

impl OllamaProvider {
    /// Create a new Ollama provider with custom host/port
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self> {
        Self::from_config(OllamaConfig {
            host: host.into(),
            port,
            ..Default::default()
        })
    }

    /// Create from configuration. The host must be an absolute URL such as
    /// `http://localhost`.
    pub fn from_config(config: OllamaConfig) -> Result<Self> {
        let url = endpoint(&config)?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client: Ollama::from_url(url),
            http,
            config,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(OllamaConfig::from_env()?)
    }

    /// Create with default localhost settings
    pub fn localhost() -> Result<Self> {
        Self::from_config(OllamaConfig::default())
    }

    pub const fn config(&self) -> &OllamaConfig {
        &self.config
    }

    /// Convert agent messages to Ollama format
    fn convert_messages(messages: &[Message]) -> Vec<WireMessage> {
        messages
            .iter()
            .map(|m| WireMessage {
                role: m.role,
                content: m.content.clone(),
                tool_calls: m
                    .tool_calls
                    .iter()
                    .map(|call| WireToolCall {
                        function: WireFunction {
                            name: call.name.clone(),
                            arguments: Value::Object(call.arguments.clone().into_iter().collect()),
                        },
                    })
                    .collect(),
                tool_name: if m.role == Role::Tool {
                    m.name.clone()
                } else {
                    None
                },
            })
            .collect()
    }

    /// Convert an Ollama reply to an agent message
    fn convert_reply(reply: WireMessage) -> Message {
        let calls = reply
            .tool_calls
            .into_iter()
            .map(|call| ToolCall {
                arguments: into_arguments(&call.function.name, call.function.arguments),
                name: call.function.name,
            })
            .collect();

        Message::new(reply.role, reply.content).with_tool_calls(calls)
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}{path}", self.config.base_url());
        let start = Instant::now();

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        tracing::debug!(
            path,
            elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Ollama response received"
        );

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AgentError::Provider(format!(
                "Ollama API error ({status}): {error_text}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AgentError::Parse(format!("Failed to parse Ollama response: {e}")))
    }

    fn transport_error(&self, e: &reqwest::Error) -> AgentError {
        if e.is_connect() {
            AgentError::ProviderUnavailable(format!(
                "Cannot connect to Ollama at {}. Is Ollama running?",
                self.config.base_url()
            ))
        } else if e.is_timeout() {
            AgentError::ProviderUnavailable(format!(
                "Ollama did not answer within {}s",
                self.config.timeout_secs
            ))
        } else {
            AgentError::Provider(e.to_string())
        }
    }
}

/// Parse the configured host and attach the port. `Ollama::new` panics on
/// hosts this rejects.
fn endpoint(config: &OllamaConfig) -> Result<reqwest::Url> {
    let invalid = |reason: &str| {
        AgentError::Config(format!("Invalid Ollama host '{}': {reason}", config.host))
    };

    let mut url = reqwest::Url::parse(config.host.trim_end_matches('/'))
        .map_err(|e| invalid(&e.to_string()))?;
    if !url.has_host() {
        return Err(invalid("expected a URL such as http://localhost"));
    }
    url.set_port(Some(config.port)).map_err(|()| invalid("URL cannot carry a port"))?;

    Ok(url)
}

/// Models sometimes send arguments as a JSON-encoded string instead of an
/// object.
fn into_arguments(tool: &str, raw: Value) -> HashMap<String, Value> {
    match raw {
        Value::Object(map) => map.into_iter().collect(),
        Value::Null => HashMap::new(),
        Value::String(encoded) => serde_json::from_str(&encoded).unwrap_or_else(|e| {
            tracing::warn!(tool, error = %e, "Unparseable tool arguments");
            HashMap::new()
        }),
        other => {
            tracing::warn!(tool, arguments = %other, "Tool arguments are not an object");
            HashMap::new()
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn chat(
        &self,
        config: &ModelConfig,
        messages: &[Message],
        tools: Option<&[ToolSchema]>,
    ) -> Result<Message> {
        let request = ChatRequest {
            model: &config.model,
            messages: Self::convert_messages(messages),
            tools: tools.map(|t| t.iter().map(ToolSchema::to_function_spec).collect()),
            stream: false,
            options: WireOptions {
                temperature: config.temperature,
            },
        };

        tracing::debug!(
            model = %config.model,
            messages = request.messages.len(),
            tools = request.tools.as_ref().map_or(0, Vec::len),
            "Ollama chat request"
        );

        let response: ChatResponse = self.post("/api/chat", &request).await?;
        Ok(Self::convert_reply(response.message))
    }

    async fn complete(&self, config: &ModelConfig, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            model: &config.model,
            prompt,
            system: config.system_prompt.as_deref(),
            stream: false,
            options: WireOptions {
                temperature: config.temperature,
            },
        };

        tracing::debug!(model = %config.model, "Ollama generate request");

        let response: GenerateResponse = self.post("/api/generate", &request).await?;
        Ok(response.response)
    }

    async fn health_check(&self) -> Result<bool> {
        match self.client.list_local_models().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("Ollama health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let models = self
            .client
            .list_local_models()
            .await
            .map_err(|e| AgentError::ProviderUnavailable(e.to_string()))?;

        Ok(models
            .into_iter()
            .map(|m| ModelInfo { name: m.name })
            .collect())
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Value>>,
    stream: bool,
    options: WireOptions,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
    options: WireOptions,
}

#[derive(Debug, Serialize)]
struct WireOptions {
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: Role,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    function: WireFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: WireMessage,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}
