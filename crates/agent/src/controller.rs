//! Turn controller
//!
//! The state machine every webhook turn passes through. A turn locks the
//! call, loads its session, dispatches on the session's stage, then persists
//! the session (or deletes it when the call ends) before releasing the lock.
//!
//! | Stage           | Valid input                 | Invalid / empty input        |
//! |-----------------|-----------------------------|------------------------------|
//! | Greeting        | always proceeds             | always proceeds              |
//! | LanguageSelect  | → IdentityPrompt            | language menu again          |
//! | IdentityPrompt  | → ServiceSelect             | identity prompt again        |
//! | ServiceSelect   | → InConversation            | service list again           |
//! | InConversation  | model reply, stay           | empty input ends the call    |

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use hotel_voice_config::HotelCatalog;
use hotel_voice_core::{
    fill, InputMode, LanguageChoice, LanguageProfile, Prompt, Session, Stage, TurnInput,
};
use hotel_voice_llm::LlmBackend;
use hotel_voice_persistence::SessionStore;

use crate::agent_config::AgentConfig;
use crate::dialogue::{DialogueEngine, DialogueOutcome};
use crate::escalation::EscalationDetector;
use crate::keywords::{KeywordMatcher, WordMatcher};
use crate::language::LanguageResolver;
use crate::router::ServiceRouter;
use crate::slots::{Slot, SlotFillingEngine, SlotOutcome};
use crate::traits::TurnHandler;
use crate::AgentError;

/// One inbound webhook turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRequest {
    pub call_id: String,
    /// Caller number as reported by the transport
    pub caller: String,
    pub input: TurnInput,
}

impl TurnRequest {
    pub fn new(call_id: impl Into<String>, caller: impl Into<String>, input: TurnInput) -> Self {
        Self {
            call_id: call_id.into(),
            caller: caller.into(),
            input,
        }
    }
}

/// What a turn did, for logs and metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Moved to the next stage
    Advanced,
    /// Input missing or unrecognised; same stage asked again
    Reprompted,
    Answered,
    Fallback,
    Escalated,
    /// Caller said goodbye or went silent
    Ended,
    /// Store or internal failure; apology spoken
    Failed,
}

impl TurnOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnOutcome::Advanced => "advanced",
            TurnOutcome::Reprompted => "reprompted",
            TurnOutcome::Answered => "answered",
            TurnOutcome::Fallback => "fallback",
            TurnOutcome::Escalated => "escalated",
            TurnOutcome::Ended => "ended",
            TurnOutcome::Failed => "failed",
        }
    }
}

impl From<DialogueOutcome> for TurnOutcome {
    fn from(outcome: DialogueOutcome) -> Self {
        match outcome {
            DialogueOutcome::Answered => TurnOutcome::Answered,
            DialogueOutcome::Fallback => TurnOutcome::Fallback,
            DialogueOutcome::Escalated => TurnOutcome::Escalated,
        }
    }
}

/// Result of one turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnResult {
    pub prompt: Prompt,
    /// Stage the session was in when the turn arrived
    pub stage: Stage,
    pub outcome: TurnOutcome,
}

pub struct TurnController {
    catalog: Arc<HotelCatalog>,
    store: Arc<dyn SessionStore>,
    languages: LanguageResolver,
    slots: SlotFillingEngine,
    router: ServiceRouter,
    dialogue: DialogueEngine,
    matcher: Arc<dyn KeywordMatcher>,
    config: AgentConfig,
}

impl TurnController {
    pub fn new(
        catalog: Arc<HotelCatalog>,
        store: Arc<dyn SessionStore>,
        backend: Arc<dyn LlmBackend>,
        config: AgentConfig,
    ) -> Result<Self, AgentError> {
        Self::with_matcher(catalog, store, backend, config, Arc::new(WordMatcher::new()))
    }

    /// Build with a custom keyword matching strategy
    pub fn with_matcher(
        catalog: Arc<HotelCatalog>,
        store: Arc<dyn SessionStore>,
        backend: Arc<dyn LlmBackend>,
        config: AgentConfig,
        matcher: Arc<dyn KeywordMatcher>,
    ) -> Result<Self, AgentError> {
        if config.history_window == 0 {
            return Err(AgentError::Configuration(
                "history_window must be at least 1".to_string(),
            ));
        }

        let escalation = EscalationDetector::new(config.escalation_keywords.clone(), matcher.clone());
        let dialogue = DialogueEngine::new(
            catalog.clone(),
            backend,
            escalation,
            config.history_window,
            config.llm_timeout,
            config.auto_handoff,
        );

        Ok(Self {
            languages: LanguageResolver::new(catalog.clone(), matcher.clone()),
            slots: SlotFillingEngine::new(config.identity_digits)?,
            router: ServiceRouter::new(catalog.clone(), matcher.clone()),
            dialogue,
            catalog,
            store,
            matcher,
            config,
        })
    }

    /// Handle one turn; never fails
    ///
    /// Store failures become a spoken apology followed by a hangup.
    pub async fn handle_turn(&self, request: TurnRequest) -> Prompt {
        self.run_turn(&request).await.prompt
    }

    /// Handle one turn, reporting the stage and outcome alongside the prompt
    pub async fn run_turn(&self, request: &TurnRequest) -> TurnResult {
        match self.try_handle_turn(request).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(call_id = %request.call_id, error = %e, "Turn failed");
                TurnResult {
                    prompt: self.apology(),
                    stage: Stage::Greeting,
                    outcome: TurnOutcome::Failed,
                }
            },
        }
    }

    pub async fn try_handle_turn(&self, request: &TurnRequest) -> Result<TurnResult, AgentError> {
        let start = Instant::now();
        let _guard = self.store.lock(&request.call_id).await;

        let mut session = self.store.get(&request.call_id).await?;
        let stage = session.stage;

        let (prompt, outcome) = self.advance(&mut session, request).await;

        if session.stage.is_terminal() {
            self.store.delete(&session.call_id).await?;
        } else {
            session.touch();
            self.store.put(&session).await?;
        }

        tracing::info!(
            call_id = %request.call_id,
            from = stage.as_str(),
            to = session.stage.as_str(),
            pending = ?self.slots.next_missing(&session),
            outcome = outcome.as_str(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Turn handled"
        );

        Ok(TurnResult {
            prompt,
            stage,
            outcome,
        })
    }

    /// Generic apology in the default language; ends the call
    pub fn apology(&self) -> Prompt {
        let profile = self.catalog.default_language();
        Prompt::hangup(profile, profile.templates.apology.clone())
    }

    async fn advance(&self, session: &mut Session, request: &TurnRequest) -> (Prompt, TurnOutcome) {
        match session.stage {
            Stage::Greeting => self.greet(session, request),
            Stage::LanguageSelect => self.select_language(session, &request.input),
            Stage::IdentityPrompt => self.collect_identity(session, &request.input),
            Stage::ServiceSelect => self.select_service(session, &request.input),
            Stage::InConversation => self.converse(session, &request.input).await,
            Stage::Terminated => {
                // a leftover record of an ended call starts over
                *session = Session::new(request.call_id.clone());
                self.greet(session, request)
            },
        }
    }

    fn greet(&self, session: &mut Session, request: &TurnRequest) -> (Prompt, TurnOutcome) {
        let profile = self.catalog.default_language();
        session.language = LanguageChoice::from(profile);
        session.caller_name = self.catalog.caller_name(&request.caller);
        session.advance_to(Stage::LanguageSelect);
        self.refresh_instruction(session);

        if !request.input.is_empty() {
            return self.select_language(session, &request.input);
        }

        let greeting = fill(&profile.templates.greeting, &[("caller", session.caller_name.as_str())]);
        let text = format!("{} {}", greeting, self.language_menu());
        (self.language_prompt(text), TurnOutcome::Advanced)
    }

    fn select_language(&self, session: &mut Session, input: &TurnInput) -> (Prompt, TurnOutcome) {
        let explicit = input
            .digits_text()
            .and_then(|digits| self.languages.resolve_explicit(digits));
        let spoken = || {
            input.speech_text().and_then(|speech| {
                self.languages
                    .resolve_explicit(speech)
                    .or_else(|| self.languages.detect(speech))
            })
        };

        let resolved = explicit.or_else(spoken).or_else(|| {
            if self.config.reprompt_on_unknown_language {
                None
            } else {
                input
                    .speech_text()
                    .map(|speech| self.languages.resolve_implicit(speech))
            }
        });

        let Some(profile) = resolved else {
            tracing::debug!(call_id = %session.call_id, "Language not recognised");
            return (self.language_prompt(self.language_menu()), TurnOutcome::Reprompted);
        };

        session.language = LanguageChoice::from(profile);
        session.advance_to(Stage::IdentityPrompt);
        self.refresh_instruction(session);

        tracing::debug!(call_id = %session.call_id, language = %profile.name, "Language selected");

        let welcome = fill(&profile.templates.welcome, &[("caller", session.caller_name.as_str())]);
        let text = format!("{} {}", welcome, profile.templates.identity_prompt);
        (self.identity_prompt(profile, text), TurnOutcome::Advanced)
    }

    fn collect_identity(&self, session: &mut Session, input: &TurnInput) -> (Prompt, TurnOutcome) {
        let profile = self.profile(session);

        let room = match self.slots.fill_identity(session, input) {
            SlotOutcome::Filled(room) => room,
            SlotOutcome::Missing => {
                let text = profile.templates.identity_prompt.clone();
                return (self.identity_prompt(profile, text), TurnOutcome::Reprompted);
            },
        };

        session.advance_to(Stage::ServiceSelect);
        self.refresh_instruction(session);

        let mut text = fill(&profile.templates.identity_ack, &[("room", room.as_str())]);
        if let Some(record) = self.catalog.room(&room) {
            let balance = format!("${:.2}", record.balance);
            text.push(' ');
            text.push_str(&fill(
                &profile.templates.room_details,
                &[("guest", record.guest.as_str()), ("balance", balance.as_str())],
            ));
        }
        text.push(' ');
        text.push_str(&fill(
            &profile.templates.service_menu,
            &[("options", self.router.menu_options(profile).as_str())],
        ));

        (self.service_prompt(profile, text), TurnOutcome::Advanced)
    }

    fn select_service(&self, session: &mut Session, input: &TurnInput) -> (Prompt, TurnOutcome) {
        let profile = self.profile(session);

        let service = input
            .digits_text()
            .and_then(|digits| self.router.route(digits))
            .or_else(|| input.speech_text().and_then(|speech| self.router.route(speech)));

        let Some(service) = service else {
            let template = if input.is_empty() {
                &profile.templates.service_menu
            } else {
                &profile.templates.service_reprompt
            };
            let options = self.router.menu_options(profile);
            let text = fill(template, &[("options", options.as_str())]);
            return (self.service_prompt(profile, text), TurnOutcome::Reprompted);
        };

        session.active_service = Some(service.name.clone());
        session.advance_to(Stage::InConversation);
        self.refresh_instruction(session);

        tracing::info!(call_id = %session.call_id, service = %service.name, "Service routed");

        let text = fill(
            &profile.templates.service_connected,
            &[("service", service.label(&profile.locale))],
        );
        (Prompt::gather(profile, text, InputMode::Either), TurnOutcome::Advanced)
    }

    async fn converse(&self, session: &mut Session, input: &TurnInput) -> (Prompt, TurnOutcome) {
        debug_assert_eq!(self.slots.next_missing(session), Slot::Complete);
        let profile = self.profile(session);

        let Some(utterance) = input.text() else {
            session.advance_to(Stage::Terminated);
            return (self.goodbye(profile), TurnOutcome::Ended);
        };

        if self.is_farewell(profile, input, utterance) {
            tracing::info!(call_id = %session.call_id, "Caller ended the conversation");
            session.advance_to(Stage::Terminated);
            return (self.goodbye(profile), TurnOutcome::Ended);
        }

        let reply = self.dialogue.respond(session, utterance).await;

        if reply.outcome == DialogueOutcome::Escalated {
            session.advance_to(Stage::Terminated);
            let prompt = Prompt::hangup(profile, reply.text)
                .with_transfer(self.config.transfer_number.clone());
            return (prompt, TurnOutcome::Escalated);
        }

        let text = format!("{} {}", reply.text, profile.templates.follow_up);
        (Prompt::gather(profile, text, InputMode::Either), reply.outcome.into())
    }

    /// Finish key, or a farewell phrase in the call's or the default language
    fn is_farewell(&self, profile: &LanguageProfile, input: &TurnInput, utterance: &str) -> bool {
        let finish_key = self.config.finish_on_key.as_str();
        if input.digits_text() == Some(finish_key) {
            return true;
        }

        let default = self.catalog.default_language();
        self.matcher.matches(utterance, &profile.farewell_phrases)
            || self.matcher.matches(utterance, &default.farewell_phrases)
    }

    fn profile(&self, session: &Session) -> &LanguageProfile {
        self.catalog.language_for(&session.language)
    }

    fn refresh_instruction(&self, session: &mut Session) {
        let instruction = self.dialogue.system_instruction(session, false);
        session.set_system_instruction(instruction);
    }

    fn language_menu(&self) -> String {
        let profile = self.catalog.default_language();
        let options = profile.menu_options(
            self.catalog
                .languages()
                .iter()
                .map(|l| (l.code, l.name.as_str())),
        );
        fill(&profile.templates.language_menu, &[("options", options.as_str())])
    }

    fn language_prompt(&self, text: String) -> Prompt {
        let width = keypad_width(self.catalog.languages().len());
        Prompt::gather(self.catalog.default_language(), text, InputMode::Either).with_max_digits(width)
    }

    fn identity_prompt(&self, profile: &LanguageProfile, text: String) -> Prompt {
        let width = u8::try_from(self.slots.identity_digits()).unwrap_or(u8::MAX);
        Prompt::gather(profile, text, InputMode::Either).with_max_digits(width)
    }

    fn service_prompt(&self, profile: &LanguageProfile, text: String) -> Prompt {
        let width = keypad_width(self.catalog.services().len());
        Prompt::gather(profile, text, InputMode::Either).with_max_digits(width)
    }

    fn goodbye(&self, profile: &LanguageProfile) -> Prompt {
        Prompt::hangup(profile, profile.templates.goodbye.clone())
    }
}

#[async_trait]
impl TurnHandler for TurnController {
    async fn run_turn(&self, request: &TurnRequest) -> TurnResult {
        TurnController::run_turn(self, request).await
    }

    fn apology(&self) -> Prompt {
        TurnController::apology(self)
    }
}

/// Keypad digits needed to enter any code of a menu with `entries` items
fn keypad_width(entries: usize) -> u8 {
    entries.max(1).to_string().len() as u8
}
