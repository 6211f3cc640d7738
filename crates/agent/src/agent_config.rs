//! Agent Configuration Types

use std::time::Duration;

use hotel_voice_config::constants::{dialogue, llm, ESCALATION_KEYWORDS};
use hotel_voice_config::Settings;

/// Agent configuration
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Non-system messages kept in history and sent to the model
    pub history_window: usize,
    /// Exact length of a room number
    pub identity_digits: usize,
    /// Keypad key that ends the conversation
    pub finish_on_key: String,
    /// Hard limit for one backend call
    pub llm_timeout: Duration,
    pub escalation_keywords: Vec<String>,
    /// End the call on escalation instead of letting the model handle it
    pub auto_handoff: bool,
    pub transfer_number: Option<String>,
    /// Re-ask the language menu on unrecognised speech
    pub reprompt_on_unknown_language: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            history_window: dialogue::HISTORY_WINDOW,
            identity_digits: dialogue::IDENTITY_DIGITS,
            finish_on_key: dialogue::FINISH_ON_KEY.to_string(),
            llm_timeout: Duration::from_millis(llm::TIMEOUT_MS),
            escalation_keywords: ESCALATION_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            auto_handoff: true,
            transfer_number: None,
            reprompt_on_unknown_language: true,
        }
    }
}

impl From<&Settings> for AgentConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            history_window: settings.dialogue.history_window,
            identity_digits: settings.dialogue.identity_digits,
            finish_on_key: settings.dialogue.finish_on_key.clone(),
            llm_timeout: Duration::from_millis(settings.llm.timeout_ms),
            escalation_keywords: settings.escalation.keywords.clone(),
            auto_handoff: settings.escalation.auto_handoff,
            transfer_number: settings
                .escalation
                .transfer_number
                .clone()
                .filter(|n| !n.trim().is_empty()),
            reprompt_on_unknown_language: settings.language.reprompt_on_unknown,
        }
    }
}
