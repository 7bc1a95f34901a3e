//! Tool System
//!
//! Tools are advertised to the main model as a function catalog and invoked
//! by the orchestrator when the model asks for them. Both built-in tools
//! live at the bottom of this module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::Arc;

use crate::delegate::{MathDelegate, Summarizer};
use crate::error::{AgentError, Result};
use crate::provider::{LlmProvider, ModelSet};

/// Tool call request from the LLM
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool identifier
    pub name: String,

    /// Arguments as key-value pairs
    #[serde(default)]
    pub arguments: HashMap<String, Value>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_argument(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }

    /// String argument lookup
    pub fn str_argument(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(Value::as_str)
    }
}

/// Result from tool execution
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolResult {
    /// Tool that was called
    pub name: String,

    /// Whether execution succeeded
    pub success: bool,

    /// Output (success message or error)
    pub output: String,
}

impl ToolResult {
    pub fn success(name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            success: true,
            output: output.into(),
        }
    }

    pub fn failure(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            success: false,
            output: error.into(),
        }
    }

    /// Text spliced into the conversation as the tool message
    pub fn message_content(&self) -> String {
        if self.success {
            self.output.clone()
        } else {
            format!("Error: {}", self.output)
        }
    }
}

/// Parameter definition for tool schema
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,

    /// JSON Schema type (string, number, boolean, object, array)
    #[serde(rename = "type")]
    pub param_type: String,

    /// Human-readable description
    pub description: String,

    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,
}

impl ParameterSchema {
    /// A required string parameter
    pub fn required_string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: "string".into(),
            description: description.into(),
            required: true,
        }
    }
}

/// Tool definition schema (for LLM function calling)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description (shown to LLM)
    pub description: String,

    /// Parameter definitions
    pub parameters: Vec<ParameterSchema>,
}

impl ToolSchema {
    /// Render in the function-calling shape the inference service expects:
    /// `{"type": "function", "function": {name, description, parameters}}`.
    pub fn to_function_spec(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.parameters {
            properties.insert(
                param.name.clone(),
                json!({
                    "type": param.param_type,
                    "description": param.description,
                }),
            );
        }

        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": {
                    "type": "object",
                    "properties": properties,
                    "required": required,
                },
            },
        })
    }
}

/// Tool trait - implement to add new capabilities
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool's schema for LLM function calling
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with given arguments
    async fn execute(&self, call: &ToolCall) -> Result<ToolResult>;

    /// Validate arguments before execution
    fn validate(&self, call: &ToolCall) -> Result<()> {
        let schema = self.schema();

        for param in schema.parameters.iter().filter(|p| p.required) {
            let Some(value) = call.arguments.get(&param.name) else {
                return Err(AgentError::ToolValidation(format!(
                    "Missing required parameter: {}",
                    param.name
                )));
            };

            if param.param_type == "string" && !value.is_string() {
                return Err(AgentError::ToolValidation(format!(
                    "Parameter '{}' must be a string",
                    param.name
                )));
            }
        }

        Ok(())
    }
}

/// Registry for available tools. Keeps registration order, which is the
/// order the catalog is advertised in.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<(String, Arc<dyn Tool>)>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the weather stub and the math delegate
    pub fn with_defaults(provider: Arc<dyn LlmProvider>, models: &ModelSet) -> Self {
        let math = MathDelegate::new(provider.clone(), models.math.clone());
        let summarizer = Summarizer::new(provider, models.summarizer.clone());

        let mut registry = Self::new();
        registry.register(WeatherTool);
        registry.register(MathReasoningTool::new(math, summarizer));
        registry
    }

    /// Register a new tool, replacing any tool with the same name
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.register_boxed(Arc::new(tool));
    }

    /// Register a boxed tool
    pub fn register_boxed(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.schema().name;
        if let Some(slot) = self.tools.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = tool;
        } else {
            self.tools.push((name, tool));
        }
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, tool)| tool.clone())
    }

    /// Execute a tool call
    pub async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        let tool = self
            .get(&call.name)
            .ok_or_else(|| AgentError::ToolNotFound(call.name.clone()))?;

        tool.validate(call)?;
        tool.execute(call).await
    }

    /// Tool schemas in registration order
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.iter().map(|(_, t)| t.schema()).collect()
    }

    /// Get tool names
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

// ============================================================================
// Built-in Tools
// ============================================================================

/// Answer returned by the weather stub for every city
pub const WEATHER_STUB: &str = "Sunny and 30 degrees Celsius";

/// Weather lookup. There is no weather backend; every city gets the stub.
pub struct WeatherTool;

#[async_trait]
impl Tool for WeatherTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_current_weather".into(),
            description: "Get the current weather for a city".into(),
            parameters: vec![ParameterSchema::required_string(
                "city",
                "The name of the city",
            )],
        }
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        let city = call.str_argument("city").unwrap_or_default();
        tracing::debug!(city, "Resolving weather from stub");
        Ok(ToolResult::success("get_current_weather", WEATHER_STUB))
    }
}

/// Hands the question to the math model and returns a summary of its
/// derivation. The raw derivation never reaches the conversation.
pub struct MathReasoningTool {
    math: MathDelegate,
    summarizer: Summarizer,
}

impl MathReasoningTool {
    pub const fn new(math: MathDelegate, summarizer: Summarizer) -> Self {
        Self { math, summarizer }
    }
}

#[async_trait]
impl Tool for MathReasoningTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "perform_mathematical_reasoning".into(),
            description: "Reason about a mathematical or logical question".into(),
            parameters: vec![ParameterSchema::required_string(
                "question",
                "The question to reason about",
            )],
        }
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        let question = call
            .str_argument("question")
            .ok_or_else(|| AgentError::ToolValidation("Missing question".into()))?;

        tracing::info!(question, "Delegating to math model");
        let reasoning = self.math.solve(question).await?;
        tracing::debug!(reasoning = %reasoning, "Math model reasoning");

        let summary = self.summarizer.summarize(&reasoning).await?;
        tracing::info!(summary = %summary, "Summarized math reasoning");

        Ok(ToolResult::success("perform_mathematical_reasoning", summary))
    }
}
