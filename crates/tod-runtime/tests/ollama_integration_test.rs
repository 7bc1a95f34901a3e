//! Integration tests for the Ollama provider against a mock HTTP server
//!
//! Validates the wire format the provider speaks:
//! - chat requests carry history, catalog and temperature
//! - tool calls in replies are decoded in order
//! - generate requests carry the system instruction
//! - service failures map to provider errors

use std::sync::Arc;

use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, method, path},
};

use tod_core::{
    AgentError, LlmProvider, Message, ModelConfig, ModelSet, OrchestratorBuilder, Role,
    ToolRegistry,
};
use tod_runtime::{OllamaConfig, OllamaProvider};

fn provider_for(server: &MockServer) -> OllamaProvider {
    let uri = server.uri();
    let (host, port) = uri.rsplit_once(':').unwrap();
    OllamaProvider::from_config(OllamaConfig {
        host: host.to_string(),
        port: port.parse().unwrap(),
        timeout_secs: 5,
    })
    .unwrap()
}

fn chat_reply(message: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "model": "mistral-nemo:latest",
        "created_at": "2024-08-04T19:22:45.499127Z",
        "message": message,
        "done": true
    }))
}

async fn request_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.body_json::<Value>().unwrap())
        .collect()
}

#[tokio::test]
async fn test_chat_sends_catalog_and_decodes_tool_calls() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(chat_reply(json!({
            "role": "assistant",
            "content": "",
            "tool_calls": [
                {"function": {"name": "get_current_weather", "arguments": {"city": "Oslo"}}},
                {"function": {"name": "perform_mathematical_reasoning", "arguments": {"question": "What's 17*23?"}}}
            ]
        })))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let catalog = ToolRegistry::with_defaults(Arc::new(provider_for(&server)), &ModelSet::default())
        .schemas();
    let messages = [Message::system("You are Tod."), Message::user("Oslo weather, and 17*23?")];

    let reply = provider
        .chat(&ModelConfig::main(), &messages, Some(catalog.as_slice()))
        .await
        .unwrap();

    assert_eq!(reply.role, Role::Assistant);
    let names: Vec<&str> = reply.tool_calls.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["get_current_weather", "perform_mathematical_reasoning"]);

    let body = &request_bodies(&server).await[0];
    assert_eq!(body["model"], "mistral-nemo:latest");
    assert_eq!(body["stream"], false);
    assert!((body["options"]["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    assert_eq!(body["messages"].as_array().unwrap().len(), 2);
    assert_eq!(
        body["tools"][1],
        json!({
            "type": "function",
            "function": {
                "name": "perform_mathematical_reasoning",
                "description": "Reason about a mathematical or logical question",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "question": {
                            "type": "string",
                            "description": "The question to reason about"
                        }
                    },
                    "required": ["question"]
                }
            }
        })
    );
}

#[tokio::test]
async fn test_chat_without_catalog_omits_tools() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(chat_reply(json!({"role": "assistant", "content": "Hello!"})))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let reply = provider
        .chat(&ModelConfig::main(), &[Message::user("Hi")], None)
        .await
        .unwrap();

    assert_eq!(reply.content, "Hello!");
    assert!(!reply.has_tool_calls());
    let body = &request_bodies(&server).await[0];
    assert!(body.get("tools").is_none());
}

#[tokio::test]
async fn test_generate_sends_system_instruction() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({
            "model": "wizard-math:13b-fp16",
            "prompt": "What's 17*23?",
            "system": "Think carefully.",
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "wizard-math:13b-fp16",
            "response": "17 * 23 = 340 + 51 = 391",
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let config =
        ModelConfig::new("wizard-math:13b-fp16", 0.0).with_system_prompt("Think carefully.");

    let text = provider.complete(&config, "What's 17*23?").await.unwrap();
    assert!(text.contains("391"));
}

#[tokio::test]
async fn test_server_error_is_provider_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "model 'nope' not found"})),
        )
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let err = provider
        .chat(&ModelConfig::new("nope", 0.0), &[Message::user("Hi")], None)
        .await
        .unwrap_err();

    assert!(matches!(err, AgentError::Provider(ref m) if m.contains("not found")));
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let err = provider
        .chat(&ModelConfig::main(), &[Message::user("Hi")], None)
        .await
        .unwrap_err();

    assert!(matches!(err, AgentError::Parse(_)));
}

#[tokio::test]
async fn test_unreachable_server_is_unavailable() {
    let provider = OllamaProvider::new("http://127.0.0.1", 1).unwrap();
    let err = provider
        .chat(&ModelConfig::main(), &[Message::user("Hi")], None)
        .await
        .unwrap_err();

    assert!(matches!(err, AgentError::ProviderUnavailable(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_plain_turn_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(chat_reply(json!({"role": "assistant", "content": "Hello, my friend."})))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = OrchestratorBuilder::new()
        .provider(Arc::new(provider_for(&server)))
        .build()
        .unwrap();
    let mut conversation = orchestrator.new_conversation();

    let outcome = orchestrator.turn(&mut conversation, "Hello").await.unwrap();
    assert_eq!(outcome.answer, "Hello, my friend.");
    assert_eq!(outcome.inference_calls, 1);

    let body = &request_bodies(&server).await[0];
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1], json!({"role": "user", "content": "Hello"}));
    assert_eq!(body["tools"].as_array().unwrap().len(), 2);
}
