//! Dialogue state machine for the hotel voice line
//!
//! Features:
//! - Stage-based turn handling (language, room number, service, conversation)
//! - Keyword language detection and service routing behind `KeywordMatcher`
//! - Ordered slot filling with unbounded re-prompts
//! - AI-assisted conversation with fallback replies and escalation to staff

pub mod agent_config;
pub mod controller;
pub mod dialogue;
pub mod escalation;
pub mod keywords;
pub mod language;
pub mod router;
pub mod slots;
pub mod traits;

pub use agent_config::AgentConfig;
pub use controller::{TurnController, TurnOutcome, TurnRequest, TurnResult};
pub use dialogue::{DialogueEngine, DialogueOutcome, DialogueReply};
pub use escalation::EscalationDetector;
pub use keywords::{KeywordMatcher, WordMatcher};
pub use language::LanguageResolver;
pub use router::ServiceRouter;
pub use slots::{Slot, SlotFillingEngine, SlotOutcome};
pub use traits::TurnHandler;

use thiserror::Error;

use hotel_voice_persistence::StoreError;

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Session store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Configuration(String),
}
