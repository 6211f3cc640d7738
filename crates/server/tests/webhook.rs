//! Webhook and REST surface through the full router

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use std::sync::Arc;
use tower::ServiceExt;

use hotel_voice_agent::{TurnHandler, TurnRequest, TurnResult};
use hotel_voice_config::{HotelCatalog, Settings};
use hotel_voice_core::{Message, Prompt, Stage};
use hotel_voice_llm::{GenerationResult, LlmBackend, LlmError};
use hotel_voice_persistence::{InMemorySessionStore, SessionStore};
use hotel_voice_server::metrics::detached_handle;
use hotel_voice_server::{create_router, AppState};

struct CannedBackend {
    available: bool,
}

#[async_trait]
impl LlmBackend for CannedBackend {
    async fn generate(&self, _messages: &[Message]) -> Result<GenerationResult, LlmError> {
        Ok(GenerationResult::text("Fresh towels are on their way."))
    }

    async fn is_available(&self) -> bool {
        self.available
    }

    fn model_name(&self) -> &str {
        "canned"
    }
}

/// Handler that blows up mid-turn
struct PanickingHandler {
    catalog: HotelCatalog,
}

#[async_trait]
impl TurnHandler for PanickingHandler {
    async fn run_turn(&self, _request: &TurnRequest) -> TurnResult {
        panic!("turn exploded");
    }

    fn apology(&self) -> Prompt {
        let profile = self.catalog.default_language();
        Prompt::hangup(profile, profile.templates.apology.clone())
    }
}

fn app(available: bool) -> (Router, Arc<InMemorySessionStore>) {
    let store = Arc::new(InMemorySessionStore::new());
    let state = AppState::new(
        Settings::default(),
        HotelCatalog::builtin().unwrap(),
        store.clone(),
        Arc::new(CannedBackend { available }),
        detached_handle(),
    )
    .unwrap();
    (create_router(state), store)
}

fn form(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_first_turn_greets_with_language_menu() {
    let (router, store) = app(true);

    let response = router
        .oneshot(form("/voice/turn", "CallSid=CA1&From=%2B19496693870"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/xml");
    let xml = body_text(response).await;
    assert!(xml.contains("<Gather input=\"dtmf speech\" action=\"/voice/turn\""));
    assert!(xml.contains("numDigits=\"1\""));
    assert!(xml.contains("Hello Saeed"));
    assert!(xml.contains("<Redirect method=\"POST\">/voice/turn</Redirect>"));

    assert_eq!(store.get("CA1").await.unwrap().stage, Stage::LanguageSelect);
}

#[tokio::test]
async fn test_language_digit_switches_voice() {
    let (router, _store) = app(true);

    router
        .clone()
        .oneshot(form("/voice/turn", "CallSid=CA1&From=%2B15550001111"))
        .await
        .unwrap();
    let response = router
        .oneshot(form("/voice/turn", "CallSid=CA1&From=%2B15550001111&Digits=2"))
        .await
        .unwrap();

    let xml = body_text(response).await;
    assert!(xml.contains("<Say voice=\"Polly.Lucia-Neural\" language=\"es-ES\">"));
    assert!(xml.contains("numDigits=\"3\""));
}

#[tokio::test]
async fn test_conversation_then_silence_hangs_up() {
    let (router, store) = app(true);
    let turns = [
        "CallSid=CA9&From=x&Digits=1",
        "CallSid=CA9&From=x&Digits=204",
        "CallSid=CA9&From=x&SpeechResult=housekeeping",
        "CallSid=CA9&From=x&SpeechResult=bring+me+towels",
    ];
    let mut last = String::new();
    for body in turns {
        let response = router.clone().oneshot(form("/voice/turn", body)).await.unwrap();
        last = body_text(response).await;
    }
    assert!(last.contains("Fresh towels are on their way."));
    assert!(last.contains("finishOnKey=\"#\""));

    let response = router.oneshot(form("/voice/turn", "CallSid=CA9&From=x")).await.unwrap();
    let xml = body_text(response).await;
    assert!(xml.ends_with("<Hangup/></Response>"));
    assert!(store.load("CA9").await.unwrap().is_none());
}

#[tokio::test]
async fn test_panicking_turn_still_answers_with_apology() {
    let catalog = HotelCatalog::builtin().unwrap();
    let state = AppState::with_handler(
        Settings::default(),
        Arc::new(PanickingHandler { catalog }),
        Arc::new(InMemorySessionStore::new()),
        Arc::new(CannedBackend { available: true }),
        detached_handle(),
    );

    let response = create_router(state)
        .oneshot(form("/voice/turn", "CallSid=CA1&From=x&Digits=1"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let xml = body_text(response).await;
    assert!(xml.contains("something went wrong on our side"));
    assert!(xml.ends_with("<Hangup/></Response>"));
}

#[tokio::test]
async fn test_missing_call_sid_is_rejected() {
    let (router, _store) = app(true);
    let response = router.oneshot(form("/voice/turn", "From=x&Digits=1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_status_callback_drops_finished_calls() {
    let (router, store) = app(true);
    router
        .clone()
        .oneshot(form("/voice/turn", "CallSid=CA1&From=x"))
        .await
        .unwrap();
    router
        .clone()
        .oneshot(form("/voice/turn", "CallSid=CA2&From=x"))
        .await
        .unwrap();

    let response = router
        .clone()
        .oneshot(form("/voice/status", "CallSid=CA1&CallStatus=in-progress"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(store.load("CA1").await.unwrap().is_some());

    router
        .oneshot(form("/voice/status", "CallSid=CA1&CallStatus=completed"))
        .await
        .unwrap();
    assert!(store.load("CA1").await.unwrap().is_none());
    assert!(store.load("CA2").await.unwrap().is_some());
}

#[tokio::test]
async fn test_session_inspection() {
    let (router, _store) = app(true);
    router
        .clone()
        .oneshot(form("/voice/turn", "CallSid=CA1&From=%2B19496693870"))
        .await
        .unwrap();

    let response = router
        .clone()
        .oneshot(Request::get("/api/sessions/CA1").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["stage"], "language_select");
    assert_eq!(json["caller_name"], "Saeed");

    let response = router
        .clone()
        .oneshot(Request::delete("/api/sessions/CA1").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = router
        .oneshot(Request::get("/api/sessions/CA1").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_and_readiness() {
    let (router, _store) = app(true);
    let response = router
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (router, _store) = app(false);
    let response = router
        .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["checks"]["llm"]["status"], "unreachable");
}

#[tokio::test]
async fn test_metrics_endpoint_responds() {
    let (router, _store) = app(true);
    let response = router
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
