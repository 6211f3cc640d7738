//! OpenAI-compatible backend against a local chat completions server

use axum::{
    extract::State,
    http::HeaderMap,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hotel_voice_core::Message;
use hotel_voice_llm::{FinishReason, LlmBackend, LlmError, OpenAIBackend, OpenAIConfig};

#[derive(Clone, Default)]
struct Captured {
    body: Arc<Mutex<Option<Value>>>,
    auth: Arc<Mutex<Option<String>>>,
}

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/v1", addr)
}

fn config(endpoint: String) -> OpenAIConfig {
    OpenAIConfig {
        endpoint,
        api_key: Some("test-key".into()),
        timeout: Duration::from_millis(500),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_generate_posts_chat_completion() {
    let captured = Captured::default();
    let router = Router::new()
        .route(
            "/v1/chat/completions",
            post(
                |State(captured): State<Captured>, headers: HeaderMap, Json(body): Json<Value>| async move {
                    *captured.body.lock().unwrap() = Some(body);
                    *captured.auth.lock().unwrap() = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(String::from);
                    Json(json!({
                        "choices": [{
                            "message": {"role": "assistant", "content": " Towels are on the way. "},
                            "finish_reason": "stop"
                        }],
                        "usage": {"completion_tokens": 6, "prompt_tokens": 40, "total_tokens": 46}
                    }))
                },
            ),
        )
        .with_state(captured.clone());

    let backend = OpenAIBackend::new(config(spawn(router).await)).unwrap();
    let result = backend
        .generate(&[Message::system("be brief"), Message::user("towels please")])
        .await
        .unwrap();

    assert_eq!(result.text, "Towels are on the way.");
    assert_eq!(result.tokens, 6);
    assert_eq!(result.finish_reason, FinishReason::Stop);

    let body = captured.body.lock().unwrap().clone().unwrap();
    assert_eq!(body["model"], "grok-3");
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["content"], "towels please");
    assert_eq!(
        captured.auth.lock().unwrap().as_deref(),
        Some("Bearer test-key")
    );
}

#[tokio::test]
async fn test_http_error_maps_to_api_error() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
    );

    let backend = OpenAIBackend::new(config(spawn(router).await)).unwrap();
    let err = backend.generate(&[Message::user("hi")]).await.unwrap_err();
    assert!(matches!(err, LlmError::Api(ref msg) if msg.contains("429")));
}

#[tokio::test]
async fn test_empty_choices_is_invalid_response() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async { Json(json!({"choices": []})) }),
    );

    let backend = OpenAIBackend::new(config(spawn(router).await)).unwrap();
    let err = backend.generate(&[Message::user("hi")]).await.unwrap_err();
    assert!(matches!(err, LlmError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Json(json!({"choices": []}))
        }),
    );

    let backend = OpenAIBackend::new(config(spawn(router).await)).unwrap();
    let err = backend.generate(&[Message::user("hi")]).await.unwrap_err();
    assert!(matches!(err, LlmError::Timeout));
}

#[tokio::test]
async fn test_availability_checks_models_listing() {
    let router = Router::new().route(
        "/v1/models",
        get(|| async { Json(json!({"data": [{"id": "grok-3"}]})) }),
    );
    let backend = OpenAIBackend::new(config(spawn(router).await)).unwrap();
    assert!(backend.is_available().await);

    let router = Router::new().route(
        "/v1/models",
        get(|| async { StatusCode::UNAUTHORIZED }),
    );
    let backend = OpenAIBackend::new(config(spawn(router).await)).unwrap();
    assert!(!backend.is_available().await);
}
