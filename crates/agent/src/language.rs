//! Language resolution
//!
//! Maps the caller's menu choice or free speech to a catalog language.

use std::sync::Arc;

use hotel_voice_config::HotelCatalog;
use hotel_voice_core::LanguageProfile;

use crate::keywords::KeywordMatcher;

pub struct LanguageResolver {
    catalog: Arc<HotelCatalog>,
    matcher: Arc<dyn KeywordMatcher>,
}

impl LanguageResolver {
    pub fn new(catalog: Arc<HotelCatalog>, matcher: Arc<dyn KeywordMatcher>) -> Self {
        Self { catalog, matcher }
    }

    /// Explicit menu choice: a code ("2") or a selection word ("Spanish")
    ///
    /// Codes outside the catalog resolve to nothing. For words the first
    /// language in catalog order wins.
    pub fn resolve_explicit(&self, input: &str) -> Option<&LanguageProfile> {
        if let Some(code) = menu_code(input) {
            return code.and_then(|c| self.catalog.language(c));
        }
        self.catalog
            .languages()
            .iter()
            .find(|profile| self.matcher.matches(input, &profile.keywords))
    }

    /// Language the caller appears to be speaking
    pub fn detect(&self, utterance: &str) -> Option<&LanguageProfile> {
        self.catalog
            .languages()
            .iter()
            .find(|profile| self.matcher.matches(utterance, &profile.detection_keywords))
    }

    /// Detected language, else the default one
    pub fn resolve_implicit(&self, utterance: &str) -> &LanguageProfile {
        self.detect(utterance)
            .unwrap_or_else(|| self.catalog.default_language())
    }
}

/// Interpret input as a keypad code
///
/// `None` when the input is not numeric, `Some(None)` when it is numeric but
/// not a usable code. Surrounding punctuation from transcripts ("2.") is
/// ignored.
pub(crate) fn menu_code(input: &str) -> Option<Option<u32>> {
    let trimmed = input.trim_matches(|c: char| !c.is_alphanumeric());
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(trimmed.parse().ok())
}
