//! Centralized default values
//!
//! Single source of truth for defaults shared by settings, the agent and the
//! server.

/// AI backend endpoints
pub mod endpoints {
    /// OpenAI-compatible chat completions base URL
    pub const LLM_DEFAULT: &str = "https://api.x.ai/v1";

    pub const LLM_DEFAULT_MODEL: &str = "grok-3";

    /// Environment variable holding the backend API key
    pub const LLM_API_KEY_ENV: &str = "XAI_API_KEY";
}

/// Model sampling and request limits
pub mod llm {
    pub const TEMPERATURE: f32 = 0.7;

    /// Replies are spoken aloud, keep them short
    pub const MAX_TOKENS: usize = 200;

    pub const TIMEOUT_MS: u64 = 8_000;
}

/// Dialogue defaults
pub mod dialogue {
    /// Non-system messages kept in history and sent to the model
    pub const HISTORY_WINDOW: usize = 10;

    /// Room numbers are exactly this many digits
    pub const IDENTITY_DIGITS: usize = 3;

    /// Keypad key that ends the conversation
    pub const FINISH_ON_KEY: &str = "#";
}

/// Gather defaults handed to the telephony transport
pub mod gather {
    pub const TIMEOUT_SECS: u32 = 5;

    pub const SPEECH_TIMEOUT: &str = "auto";
}

/// Words that ask for a human
///
/// Matching is whole-word, so plurals are listed explicitly.
pub const ESCALATION_KEYWORDS: &[&str] = &[
    "human",
    "manager",
    "person",
    "complaint",
    "complaints",
    "issue",
    "issues",
    "problem",
    "problems",
    "supervisor",
    "operator",
    "representative",
];
