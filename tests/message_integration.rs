//! Message operation integration tests
//!
//! Tests message body assembly (present-fields-only serialization),
//! context round-tripping, per-call header overrides, and response
//! parsing against a `wiremock` mock server.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use parlance::client::{AssistantClient, MessageParams};
use parlance::config::ClientConfig;
use parlance::types::{MessageContext, MessageInput};

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};

const MESSAGE_PATH: &str = "/v2/assistants/my-assistant/sessions/sess_1/message";

fn client_for(server: &MockServer) -> AssistantClient {
    let config = ClientConfig {
        url: server.uri(),
        ..ClientConfig::new("2024-08-15")
    };
    AssistantClient::new(config).unwrap()
}

fn text_output(text: &str) -> serde_json::Value {
    json!({
        "output": {
            "generic": [{ "response_type": "text", "text": text }]
        }
    })
}

#[tokio::test]
async fn test_message_body_contains_only_supplied_fields() {
    let server = MockServer::start().await;

    // No context was supplied, so the body must not carry a context key
    Mock::given(method("POST"))
        .and(path(MESSAGE_PATH))
        .and(body_json(json!({ "input": { "text": "hi" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_output("Hello back")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client
        .message(MessageParams::new("my-assistant", "sess_1").input(MessageInput::text("hi")))
        .await
        .unwrap();

    let generic = response.output.generic.unwrap();
    assert_eq!(generic[0].text.as_deref(), Some("Hello back"));
}

#[tokio::test]
async fn test_message_round_trips_context() {
    let server = MockServer::start().await;

    let context_json = json!({
        "global": { "system": { "user_id": "u-7" } },
        "skills": { "main skill": { "user_defined": { "order_id": "A-17" } } }
    });

    Mock::given(method("POST"))
        .and(path(MESSAGE_PATH))
        .and(body_json(json!({
            "input": { "text": "where is my order?" },
            "context": context_json
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "output": {
                "generic": [{ "response_type": "text", "text": "On its way" }],
                "intents": [{ "intent": "order_status", "confidence": 0.92 }]
            },
            "context": {
                "global": { "system": { "user_id": "u-7", "turn_count": 2 } },
                "skills": { "main skill": { "user_defined": { "order_id": "A-17" } } }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let context: MessageContext = serde_json::from_value(context_json).unwrap();
    let client = client_for(&server);
    let response = client
        .message(
            MessageParams::new("my-assistant", "sess_1")
                .input(MessageInput::text("where is my order?"))
                .context(context),
        )
        .await
        .unwrap();

    let echoed = response.context.unwrap();
    assert_eq!(
        echoed.global.unwrap().system.unwrap().turn_count,
        Some(2)
    );
    // The opaque skills bag comes back unchanged
    assert_eq!(
        echoed.skills.unwrap()["main skill"]["user_defined"]["order_id"],
        "A-17"
    );
}

#[tokio::test]
async fn test_message_without_input_sends_empty_object() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MESSAGE_PATH))
        .and(body_json(json!({})))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_output("Welcome")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client
        .message(MessageParams::new("my-assistant", "sess_1"))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_per_call_accept_override_does_not_stick() {
    let server = MockServer::start().await;

    // First call overrides Accept for itself only
    Mock::given(method("POST"))
        .and(path(MESSAGE_PATH))
        .and(header("accept", "text/plain"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_output("first")))
        .expect(1)
        .mount(&server)
        .await;

    // Second call is back on the default
    Mock::given(method("POST"))
        .and(path(MESSAGE_PATH))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_output("second")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("text/plain"));
    let mut params = MessageParams::new("my-assistant", "sess_1");
    params.headers = Some(headers);
    client.message(params).await.unwrap();

    client
        .message(MessageParams::new("my-assistant", "sess_1"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_missing_identifiers_issue_no_network_call() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let err = client
        .message(MessageParams {
            input: Some(MessageInput::text("hi")),
            ..MessageParams::default()
        })
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Missing required parameters: assistant_id, session_id"
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_service_errors_array_is_extracted() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MESSAGE_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": [{ "message": "input.text must not be empty" }]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .message(MessageParams::new("my-assistant", "sess_1"))
        .await
        .unwrap_err();
    assert!(err
        .to_string()
        .contains("input.text must not be empty"));
}

#[tokio::test]
async fn test_malformed_json_response_surfaces_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(MESSAGE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client
        .message(MessageParams::new("my-assistant", "sess_1"))
        .await
        .is_err());
}
