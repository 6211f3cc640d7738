//! Turn input and output types

use serde::{Deserialize, Serialize};

use crate::language::LanguageProfile;

/// Input the caller is expected to give next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    Digits,
    Speech,
    Either,
    /// No further input; the call ends
    None,
}

/// Raw caller input for one turn
///
/// Both fields are optional; both absent (or blank) means "no usable input".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnInput {
    pub digits: Option<String>,
    pub speech: Option<String>,
}

impl TurnInput {
    pub fn digits(digits: impl Into<String>) -> Self {
        Self {
            digits: Some(digits.into()),
            speech: None,
        }
    }

    pub fn speech(speech: impl Into<String>) -> Self {
        Self {
            digits: None,
            speech: Some(speech.into()),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    /// Trimmed digit input, `None` when blank
    pub fn digits_text(&self) -> Option<&str> {
        self.digits.as_deref().map(str::trim).filter(|d| !d.is_empty())
    }

    /// Trimmed speech transcript, `None` when blank
    pub fn speech_text(&self) -> Option<&str> {
        self.speech.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Speech first, then digits
    pub fn text(&self) -> Option<&str> {
        self.speech_text().or_else(|| self.digits_text())
    }

    pub fn is_empty(&self) -> bool {
        self.text().is_none()
    }
}

/// What the transport should do at the end of a turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    /// Localized text to speak
    pub text: String,
    pub locale: String,
    pub voice: String,
    pub input: InputMode,
    /// Upper bound on keypad digits to gather
    pub max_digits: Option<u8>,
    pub terminate: bool,
    /// Number to hand the call over to after speaking
    pub transfer_to: Option<String>,
}

impl Prompt {
    /// Speak `text` then gather more input
    pub fn gather(profile: &LanguageProfile, text: impl Into<String>, input: InputMode) -> Self {
        Self {
            text: text.into(),
            locale: profile.locale.clone(),
            voice: profile.voice.clone(),
            input,
            max_digits: None,
            terminate: false,
            transfer_to: None,
        }
    }

    /// Speak `text` then end the call
    pub fn hangup(profile: &LanguageProfile, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            locale: profile.locale.clone(),
            voice: profile.voice.clone(),
            input: InputMode::None,
            max_digits: None,
            terminate: true,
            transfer_to: None,
        }
    }

    pub fn with_max_digits(mut self, max_digits: u8) -> Self {
        self.max_digits = Some(max_digits);
        self
    }

    pub fn with_transfer(mut self, number: Option<String>) -> Self {
        self.transfer_to = number;
        self
    }
}
