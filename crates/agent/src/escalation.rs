//! Human hand-off detection

use std::sync::Arc;

use hotel_voice_core::{Role, Session};

use crate::keywords::KeywordMatcher;

pub struct EscalationDetector {
    keywords: Vec<String>,
    matcher: Arc<dyn KeywordMatcher>,
}

impl EscalationDetector {
    pub fn new(keywords: Vec<String>, matcher: Arc<dyn KeywordMatcher>) -> Self {
        Self { keywords, matcher }
    }

    /// Whether the caller asked for a human anywhere in the call
    ///
    /// Only caller messages count; the assistant's own wording never
    /// escalates. `localized` adds the keywords of the call's language.
    pub fn should_escalate(&self, session: &Session, localized: &[String]) -> bool {
        let transcript = session
            .conversation()
            .iter()
            .filter(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        self.mentions(&transcript) || self.matcher.matches(&transcript, localized)
    }

    pub fn mentions(&self, text: &str) -> bool {
        self.matcher.matches(text, &self.keywords)
    }
}
