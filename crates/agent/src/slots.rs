//! Slot filling
//!
//! Required facts are collected in a fixed order: language, then identity
//! (room number), then service. A missing or unreadable value is never an
//! error; the stage re-asks for it.

use regex::Regex;

use hotel_voice_core::{Session, Stage, TurnInput};

use crate::AgentError;

/// Next fact the call still needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Language,
    Identity,
    Service,
    Complete,
}

/// Result of trying to fill a slot from one turn's input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotOutcome {
    Filled(String),
    Missing,
}

pub struct SlotFillingEngine {
    identity_digits: usize,
    identity_pattern: Regex,
}

impl SlotFillingEngine {
    /// `identity_digits` is the exact length of a room number
    pub fn new(identity_digits: usize) -> Result<Self, AgentError> {
        if identity_digits == 0 {
            return Err(AgentError::Configuration(
                "identity_digits must be at least 1".to_string(),
            ));
        }
        let identity_pattern = Regex::new(&format!(r"\b[0-9]{{{}}}\b", identity_digits))
            .map_err(|e| AgentError::Configuration(e.to_string()))?;

        Ok(Self {
            identity_digits,
            identity_pattern,
        })
    }

    pub fn identity_digits(&self) -> usize {
        self.identity_digits
    }

    pub fn next_missing(&self, session: &Session) -> Slot {
        if matches!(session.stage, Stage::Greeting | Stage::LanguageSelect) {
            Slot::Language
        } else if session.room_number.is_none() {
            Slot::Identity
        } else if session.active_service.is_none() {
            Slot::Service
        } else {
            Slot::Complete
        }
    }

    /// Room number from keypad digits or a transcript
    ///
    /// Keypad input is stripped of anything that is not a digit and must
    /// leave exactly N digits. In speech the first standalone N-digit token
    /// wins.
    pub fn extract_identity(&self, input: &TurnInput) -> Option<String> {
        if let Some(digits) = input.digits_text() {
            let cleaned: String = digits.chars().filter(|c| c.is_ascii_digit()).collect();
            if cleaned.len() == self.identity_digits {
                return Some(cleaned);
            }
        }

        input
            .speech_text()
            .and_then(|speech| self.identity_pattern.find(speech))
            .map(|m| m.as_str().to_string())
    }

    pub fn fill_identity(&self, session: &mut Session, input: &TurnInput) -> SlotOutcome {
        match self.extract_identity(input) {
            Some(room) => {
                session.room_number = Some(room.clone());
                SlotOutcome::Filled(room)
            },
            None => SlotOutcome::Missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> SlotFillingEngine {
        SlotFillingEngine::new(3).unwrap()
    }

    #[test]
    fn test_identity_from_speech() {
        let engine = engine();
        assert_eq!(
            engine.extract_identity(&TurnInput::speech("my room is 204 please")),
            Some("204".to_string())
        );
        assert_eq!(
            engine.extract_identity(&TurnInput::speech("room 1204, no wait, 305")),
            Some("305".to_string())
        );
        assert_eq!(engine.extract_identity(&TurnInput::speech("room 20")), None);
        assert_eq!(engine.extract_identity(&TurnInput::speech("a204")), None);
    }

    #[test]
    fn test_identity_from_digits() {
        let engine = engine();
        assert_eq!(
            engine.extract_identity(&TurnInput::digits("204")),
            Some("204".to_string())
        );
        assert_eq!(
            engine.extract_identity(&TurnInput::digits("2-0-4#")),
            Some("204".to_string())
        );
        assert_eq!(engine.extract_identity(&TurnInput::digits("20")), None);
        assert_eq!(engine.extract_identity(&TurnInput::digits("2044")), None);
        assert_eq!(engine.extract_identity(&TurnInput::none()), None);
    }

    #[test]
    fn test_fill_identity_leaves_slot_empty_on_failure() {
        let engine = engine();
        let mut session = Session::new("CA1");

        assert_eq!(
            engine.fill_identity(&mut session, &TurnInput::digits("20")),
            SlotOutcome::Missing
        );
        assert!(session.room_number.is_none());

        assert_eq!(
            engine.fill_identity(&mut session, &TurnInput::speech("it's 302")),
            SlotOutcome::Filled("302".into())
        );
        assert_eq!(session.room_number.as_deref(), Some("302"));
    }

    #[test]
    fn test_next_missing_follows_slot_order() {
        let engine = engine();
        let mut session = Session::new("CA1");
        assert_eq!(engine.next_missing(&session), Slot::Language);

        session.advance_to(Stage::LanguageSelect);
        session.advance_to(Stage::IdentityPrompt);
        assert_eq!(engine.next_missing(&session), Slot::Identity);

        session.room_number = Some("101".into());
        assert_eq!(engine.next_missing(&session), Slot::Service);

        session.active_service = Some("concierge".into());
        assert_eq!(engine.next_missing(&session), Slot::Complete);
    }

    #[test]
    fn test_configurable_length() {
        let engine = SlotFillingEngine::new(4).unwrap();
        assert_eq!(
            engine.extract_identity(&TurnInput::speech("suite 1204")),
            Some("1204".to_string())
        );
        assert!(SlotFillingEngine::new(0).is_err());
    }
}
