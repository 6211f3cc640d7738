//! HTTP Endpoints
//!
//! Webhooks for the telephony transport plus a small REST surface for
//! session inspection, health and metrics.

use axum::{
    extract::{Path, State},
    http::{HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::metrics::metrics_handler;
use crate::state::AppState;
use crate::webhook::{call_status, voice_turn};
use crate::ServerError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(&state.settings.server.cors_origins, state.settings.server.cors_enabled);
    let turn_path = state.settings.server.turn_path.clone();

    Router::new()
        // Telephony webhooks
        .route(&turn_path, post(voice_turn))
        .route("/voice/status", post(call_status))

        // Session inspection
        .route("/api/sessions/:call_id", get(get_session).delete(delete_session))

        // Health check
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))

        .route("/metrics", get(metrics_handler))

        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns permissive layer (for dev)
/// - If cors_origins is empty, defaults to localhost:3000
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    if parsed_origins.is_empty() {
        tracing::info!("No valid CORS origins configured, defaulting to localhost:3000");
        return layer.allow_origin(HeaderValue::from_static("http://localhost:3000"));
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    layer.allow_origin(parsed_origins)
}

/// Stored session of a live call
async fn get_session(
    State(state): State<AppState>,
    Path(call_id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let session = state
        .store
        .load(&call_id)
        .await?
        .ok_or_else(|| ServerError::SessionNotFound(call_id.clone()))?;

    Ok(Json(serde_json::json!({
        "call_id": session.call_id,
        "stage": session.stage,
        "stage_name": session.stage.display_name(),
        "language": session.language,
        "caller_name": session.caller_name,
        "room_number": session.room_number,
        "active_service": session.active_service,
        "messages": session.conversation().len(),
        "history": session.history,
        "updated_at": session.updated_at,
    })))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(call_id): Path<String>,
) -> Result<StatusCode, ServerError> {
    let _guard = state.store.lock(&call_id).await;
    state.store.delete(&call_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Health check
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "store": state.store.backend_name(),
    }))
}

/// Readiness check; the AI backend must answer
async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let llm_ok = state.backend.is_available().await;

    let status_code = if llm_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(serde_json::json!({
            "status": if llm_ok { "ready" } else { "degraded" },
            "checks": {
                "llm": {
                    "status": if llm_ok { "ok" } else { "unreachable" },
                    "model": state.backend.model_name(),
                },
                "store": { "status": "ok", "backend": state.store.backend_name() },
            },
        })),
    )
}
