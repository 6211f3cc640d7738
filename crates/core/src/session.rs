//! Per-call session record
//!
//! A `Session` is everything the system remembers about a call between two
//! stateless webhook turns. It is created on the first turn, mutated only by
//! the turn controller and removed from the store when the call ends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::conversation::{Message, Role, Stage};
use crate::language::LanguageProfile;
use crate::Result;

/// Display name used until the caller is recognised
pub const DEFAULT_CALLER_NAME: &str = "guest";

/// Resolved call language, copied out of the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageChoice {
    pub code: u32,
    pub locale: String,
    pub voice: String,
}

impl Default for LanguageChoice {
    fn default() -> Self {
        Self {
            code: 1,
            locale: "en-US".to_string(),
            voice: "Polly.Joanna-Neural".to_string(),
        }
    }
}

impl From<&LanguageProfile> for LanguageChoice {
    fn from(profile: &LanguageProfile) -> Self {
        Self {
            code: profile.code,
            locale: profile.locale.clone(),
            voice: profile.voice.clone(),
        }
    }
}

/// Session state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub call_id: String,
    pub stage: Stage,
    pub language: LanguageChoice,
    pub caller_name: String,
    /// Identity slot
    pub room_number: Option<String>,
    /// Display name of the routed service
    pub active_service: Option<String>,
    /// `history[0]` is the system instruction for the current stage
    pub history: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Fresh session at the start of a call
    pub fn new(call_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            call_id: call_id.into(),
            stage: Stage::default(),
            language: LanguageChoice::default(),
            caller_name: DEFAULT_CALLER_NAME.to_string(),
            room_number: None,
            active_service: None,
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Move to `target`, refusing regressions.
    ///
    /// Returns whether the stage changed.
    pub fn advance_to(&mut self, target: Stage) -> bool {
        if self.stage == target || !self.stage.can_transition_to(target) {
            return false;
        }
        self.stage = target;
        true
    }

    /// Replace the leading system instruction (or insert one)
    pub fn set_system_instruction(&mut self, content: impl Into<String>) {
        let message = Message::system(content);
        match self.history.first_mut() {
            Some(first) if first.role == Role::System => *first = message,
            _ => self.history.insert(0, message),
        }
    }

    pub fn system_instruction(&self) -> Option<&str> {
        self.history
            .first()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
    }

    /// Non-system messages, oldest first
    pub fn conversation(&self) -> &[Message] {
        match self.history.first() {
            Some(first) if first.role == Role::System => &self.history[1..],
            _ => &self.history,
        }
    }

    /// The `window` most recent non-system messages
    pub fn recent(&self, window: usize) -> &[Message] {
        let conversation = self.conversation();
        let start = conversation.len().saturating_sub(window);
        &conversation[start..]
    }

    /// Append a message and drop the oldest non-system ones beyond `cap`
    pub fn push_message(&mut self, message: Message, cap: usize) {
        self.history.push(message);
        let offset = usize::from(self.system_instruction().is_some());
        let excess = (self.history.len() - offset).saturating_sub(cap);
        if excess > 0 {
            self.history.drain(offset..offset + excess);
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
