//! OpenAI-compatible gateway against a mock HTTP endpoint.

use monia_agent::{
    ChatGateway, ChatMessage, ChatRequest, Error, FinishReason, ModelConfig, OpenAiGateway,
    ToolDefinition,
};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn gateway(server: &MockServer) -> OpenAiGateway {
    assert_ok!(OpenAiGateway::new(ModelConfig::new(
        "sk-test",
        format!("{}/v1", server.uri()),
        "gpt-test",
    )))
}

fn request(prompt: &str) -> ChatRequest {
    ChatRequest {
        system: "You are a clock.".into(),
        messages: vec![ChatMessage::user(prompt)],
        tools: vec![ToolDefinition::new(
            "get_current_time",
            "Returns the current time",
            json!({"type": "object", "properties": {}}),
        )],
    }
}

#[tokio::test]
async fn test_text_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-test",
            "messages": [
                {"role": "system", "content": "You are a clock."},
                {"role": "user", "content": "hello"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "finish_reason": "stop",
                "message": {"role": "assistant", "content": "Hi there"}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway(&server).await;
    assert!(!gateway.is_connected());

    let response = assert_ok!(gateway.send(&request("hello")).await);
    assert_eq!(response.finish_reason, FinishReason::Text);
    assert_eq!(response.last_text(), "Hi there");
    assert!(response.tool_calls.is_empty());
    assert!(gateway.is_connected());
}

#[tokio::test]
async fn test_tool_call_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "tools": [{"type": "function", "function": {"name": "get_current_time"}}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "finish_reason": "tool_calls",
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "get_current_time", "arguments": "{\"zone\":\"UTC\"}"}
                    }]
                }
            }]
        })))
        .mount(&server)
        .await;

    let response = assert_ok!(gateway(&server).await.send(&request("time?")).await);

    assert_eq!(response.finish_reason, FinishReason::ToolCalls);
    assert_eq!(response.tool_calls.len(), 1);
    assert_eq!(response.tool_calls[0].id, "call_1");
    assert_eq!(response.tool_calls[0].name, "get_current_time");
    assert_eq!(response.tool_calls[0].arguments, json!({"zone": "UTC"}));
}

#[tokio::test]
async fn test_http_error_carries_status_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Incorrect API key provided"}
        })))
        .mount(&server)
        .await;

    let err = assert_err!(gateway(&server).await.send(&request("hello")).await);

    match &err {
        Error::Api { message, status } => {
            assert_eq!(message, "Incorrect API key provided");
            assert_eq!(*status, Some(401));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_server_error_is_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let err = assert_err!(gateway(&server).await.send(&request("hello")).await);
    assert!(err.is_retryable());
    assert_eq!(err.status_code(), Some(503));
    assert!(err.to_string().contains("overloaded"));
}

#[tokio::test]
async fn test_empty_choices_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let err = assert_err!(gateway(&server).await.send(&request("hello")).await);
    assert!(matches!(err, Error::Parse(_)));
}
