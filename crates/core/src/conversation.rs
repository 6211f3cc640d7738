//! Conversation types including stages and chat messages

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a call in the dialogue state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum Stage {
    /// Call just started, nothing said yet
    #[default]
    Greeting,
    /// Waiting for the caller to pick a language
    LanguageSelect,
    /// Waiting for the room number
    IdentityPrompt,
    /// Waiting for a service category
    ServiceSelect,
    /// Free-form conversation with the assistant
    InConversation,
    /// Call ended; the session is removed from the store
    Terminated,
}

impl Stage {
    /// Stage reached when the current one completes successfully
    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::Greeting => Some(Stage::LanguageSelect),
            Stage::LanguageSelect => Some(Stage::IdentityPrompt),
            Stage::IdentityPrompt => Some(Stage::ServiceSelect),
            Stage::ServiceSelect => Some(Stage::InConversation),
            Stage::InConversation => Some(Stage::Terminated),
            Stage::Terminated => None,
        }
    }

    /// Stages only move forward; staying put is a re-prompt.
    /// Any live stage may end the call.
    pub fn can_transition_to(&self, target: Stage) -> bool {
        if *self == Stage::Terminated {
            return false;
        }
        target == *self || target == Stage::Terminated || self.next() == Some(target)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Terminated)
    }

    /// Stage guidance folded into the system instruction
    pub fn prompt_guidance(&self) -> &'static str {
        match self {
            Stage::Greeting => "Greet the caller warmly and offer the language menu.",
            Stage::LanguageSelect => "Help the caller choose a language for the call.",
            Stage::IdentityPrompt => {
                "Ask for the caller's room number before offering any service."
            },
            Stage::ServiceSelect => {
                "Help the caller pick one of the hotel services on offer."
            },
            Stage::InConversation => {
                "Respond briefly, engagingly and helpfully. Use context from previous \
                 messages. Keep answers short enough to be read aloud."
            },
            Stage::Terminated => "The call has ended.",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Stage::Greeting => "Greeting",
            Stage::LanguageSelect => "Language Select",
            Stage::IdentityPrompt => "Identity Prompt",
            Stage::ServiceSelect => "Service Select",
            Stage::InConversation => "In Conversation",
            Stage::Terminated => "Terminated",
        }
    }

    /// Stable label for metrics and log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Greeting => "greeting",
            Stage::LanguageSelect => "language_select",
            Stage::IdentityPrompt => "identity_prompt",
            Stage::ServiceSelect => "service_select",
            Stage::InConversation => "in_conversation",
            Stage::Terminated => "terminated",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
