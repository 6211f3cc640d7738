//! Core types for the hotel voice line
//!
//! This crate provides the data model shared by every other crate:
//! - Conversation stages and chat messages
//! - The per-call `Session` record
//! - Static catalog entries (languages, services)
//! - The `Prompt` emitted at the end of each turn
//! - Error types

pub mod conversation;
pub mod error;
pub mod language;
pub mod prompt;
pub mod service;
pub mod session;

pub use conversation::{Message, Role, Stage};
pub use error::{Error, Result};
pub use language::{fill, LanguageProfile, PromptTemplates};
pub use prompt::{InputMode, Prompt, TurnInput};
pub use service::ServiceDefinition;
pub use session::{LanguageChoice, Session, DEFAULT_CALLER_NAME};
