//! Free-form conversation with the AI backend
//!
//! One `respond` call is one caller utterance: it records the utterance,
//! checks for escalation, rebuilds the system instruction and asks the
//! backend for a reply. Backend failures never surface as errors; the caller
//! hears a localized fallback sentence and the next utterance tries again.

use std::sync::Arc;
use std::time::Duration;

use hotel_voice_config::HotelCatalog;
use hotel_voice_core::{Message, Session};
use hotel_voice_llm::LlmBackend;

use crate::escalation::EscalationDetector;

/// How a dialogue turn was answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueOutcome {
    /// The model produced a reply
    Answered,
    /// The backend failed or timed out
    Fallback,
    /// The caller asked for a human; the model was not called
    Escalated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueReply {
    pub text: String,
    pub outcome: DialogueOutcome,
}

pub struct DialogueEngine {
    catalog: Arc<HotelCatalog>,
    backend: Arc<dyn LlmBackend>,
    escalation: EscalationDetector,
    history_window: usize,
    timeout: Duration,
    auto_handoff: bool,
}

impl DialogueEngine {
    pub fn new(
        catalog: Arc<HotelCatalog>,
        backend: Arc<dyn LlmBackend>,
        escalation: EscalationDetector,
        history_window: usize,
        timeout: Duration,
        auto_handoff: bool,
    ) -> Self {
        Self {
            catalog,
            backend,
            escalation,
            history_window,
            timeout,
            auto_handoff,
        }
    }

    /// Answer one caller utterance
    pub async fn respond(&self, session: &mut Session, utterance: &str) -> DialogueReply {
        let profile = self.catalog.language_for(&session.language);
        let templates = &profile.templates;

        session.push_message(Message::user(utterance), self.history_window);

        let escalation_requested = self
            .escalation
            .should_escalate(session, &profile.escalation_keywords);
        if escalation_requested && self.auto_handoff {
            tracing::info!(call_id = %session.call_id, "Caller asked for staff");
            return DialogueReply {
                text: templates.escalation.clone(),
                outcome: DialogueOutcome::Escalated,
            };
        }

        let instruction = self.system_instruction(session, escalation_requested);
        session.set_system_instruction(instruction);

        let mut messages = Vec::with_capacity(self.history_window + 1);
        messages.extend(session.history.first().cloned());
        messages.extend(session.recent(self.history_window).iter().cloned());

        let result = tokio::time::timeout(self.timeout, self.backend.generate(&messages)).await;

        let failure = match result {
            Ok(Ok(generation)) if !generation.text.trim().is_empty() => {
                let text = generation.text.trim().to_string();
                session.push_message(Message::assistant(text.clone()), self.history_window);
                tracing::debug!(
                    call_id = %session.call_id,
                    model = self.backend.model_name(),
                    tokens = generation.tokens,
                    "Model replied"
                );
                return DialogueReply {
                    text,
                    outcome: DialogueOutcome::Answered,
                };
            },
            Ok(Ok(_)) => "empty completion".to_string(),
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("timed out after {}ms", self.timeout.as_millis()),
        };

        tracing::warn!(
            call_id = %session.call_id,
            error = %failure,
            "Model unavailable, using fallback reply"
        );
        DialogueReply {
            text: templates.fallback.clone(),
            outcome: DialogueOutcome::Fallback,
        }
    }

    /// System instruction for the session's current stage, service and room
    pub fn system_instruction(&self, session: &Session, escalation_requested: bool) -> String {
        let profile = self.catalog.language_for(&session.language);

        let mut parts = vec![
            self.catalog.persona().trim().to_string(),
            session.stage.prompt_guidance().to_string(),
            format!("The caller's name is {}.", session.caller_name),
        ];

        if let Some(ref room) = session.room_number {
            match self.catalog.room(room) {
                Some(record) => parts.push(format!(
                    "The guest is in room {}. Guest: {}, status: {}, balance: ${:.2}. Reference this if relevant.",
                    room, record.guest, record.status, record.balance
                )),
                None => parts.push(format!("The guest is in room {}.", room)),
            }
        }

        if let Some(service) = session
            .active_service
            .as_deref()
            .and_then(|name| self.catalog.service_by_name(name))
        {
            parts.push(service.instruction());
        }

        parts.push(profile.templates.respond_in.clone());

        if escalation_requested {
            parts.push(
                "The caller wants to speak with a member of staff. Escalate politely and \
                 tell them someone will follow up."
                    .to_string(),
            );
        }

        parts.join(" ")
    }
}
