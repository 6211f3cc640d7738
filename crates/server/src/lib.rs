//! Hotel Voice Server
//!
//! Receives telephony webhooks, runs one dialogue turn per request and
//! answers with TwiML. Also exposes session inspection, health and
//! Prometheus metrics.

pub mod http;
pub mod metrics;
pub mod state;
pub mod twiml;
pub mod webhook;

pub use http::create_router;
pub use metrics::{init_metrics, record_call_status, record_turn};
pub use state::AppState;
pub use twiml::{render, GatherOptions};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use hotel_voice_agent::AgentError;
use hotel_voice_persistence::StoreError;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Session store error: {0}")]
    Store(#[from] StoreError),

    #[error("TwiML rendering failed: {0}")]
    Render(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AgentError> for ServerError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Store(e) => ServerError::Store(e),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl From<ServerError> for StatusCode {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let status = StatusCode::from(self);
        if status.is_server_error() {
            tracing::error!(error = %message, "Request failed");
        }
        (status, message).into_response()
    }
}
