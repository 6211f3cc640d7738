//! Telephony webhooks
//!
//! The transport posts one form per caller turn (`CallSid`, `From`,
//! `Digits`, `SpeechResult`) and one per call status change. Every turn is
//! answered with HTTP 200 and a TwiML document, even when the turn itself
//! failed.

use axum::{
    extract::{Form, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use futures::FutureExt;
use serde::Deserialize;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use hotel_voice_agent::{TurnOutcome, TurnRequest, TurnResult};
use hotel_voice_core::{Stage, TurnInput};

use crate::metrics::{record_call_status, record_turn};
use crate::state::AppState;
use crate::twiml;
use crate::ServerError;

/// Call statuses after which the call will never post another turn
pub const TERMINAL_CALL_STATUSES: &[&str] = &["completed", "busy", "failed", "no-answer", "canceled"];

#[derive(Debug, Deserialize)]
pub struct TurnForm {
    #[serde(rename = "CallSid")]
    pub call_sid: Option<String>,
    #[serde(rename = "From", default)]
    pub from: String,
    #[serde(rename = "Digits")]
    pub digits: Option<String>,
    #[serde(rename = "SpeechResult")]
    pub speech_result: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    #[serde(rename = "CallSid")]
    pub call_sid: Option<String>,
    #[serde(rename = "CallStatus", default)]
    pub call_status: String,
}

fn call_id(sid: Option<String>) -> Result<String, ServerError> {
    sid.map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServerError::InvalidRequest("CallSid is required".to_string()))
}

/// One caller turn
pub async fn voice_turn(
    State(state): State<AppState>,
    Form(form): Form<TurnForm>,
) -> Result<Response, ServerError> {
    let start = Instant::now();
    let request = TurnRequest::new(
        call_id(form.call_sid)?,
        form.from,
        TurnInput {
            digits: form.digits,
            speech: form.speech_result,
        },
    );

    let result = match AssertUnwindSafe(state.handler.run_turn(&request))
        .catch_unwind()
        .await
    {
        Ok(result) => result,
        Err(_) => {
            tracing::error!(call_id = %request.call_id, "Turn panicked");
            TurnResult {
                prompt: state.handler.apology(),
                stage: Stage::Greeting,
                outcome: TurnOutcome::Failed,
            }
        },
    };

    record_turn(result.stage, result.outcome, start.elapsed());

    let body = twiml::render(&result.prompt, &state.gather)?;
    Ok(([(header::CONTENT_TYPE, "text/xml")], body).into_response())
}

/// Call status callback; drops the session of a finished call
pub async fn call_status(
    State(state): State<AppState>,
    Form(form): Form<StatusForm>,
) -> Result<StatusCode, ServerError> {
    let call_id = call_id(form.call_sid)?;
    let status = form.call_status.trim().to_ascii_lowercase();
    record_call_status(&status);

    if TERMINAL_CALL_STATUSES.contains(&status.as_str()) {
        let _guard = state.store.lock(&call_id).await;
        state.store.delete(&call_id).await?;
        tracing::info!(call_id = %call_id, status = %status, "Call finished, session dropped");
    } else {
        tracing::debug!(call_id = %call_id, status = %status, "Call status");
    }

    Ok(StatusCode::NO_CONTENT)
}
