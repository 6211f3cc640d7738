//! Service routing

use std::sync::Arc;

use hotel_voice_config::HotelCatalog;
use hotel_voice_core::{LanguageProfile, ServiceDefinition};

use crate::keywords::KeywordMatcher;
use crate::language::menu_code;

pub struct ServiceRouter {
    catalog: Arc<HotelCatalog>,
    matcher: Arc<dyn KeywordMatcher>,
}

impl ServiceRouter {
    pub fn new(catalog: Arc<HotelCatalog>, matcher: Arc<dyn KeywordMatcher>) -> Self {
        Self { catalog, matcher }
    }

    /// Service for a menu code or an utterance
    ///
    /// Codes are checked first; otherwise the first service in catalog order
    /// with a matching keyword wins.
    pub fn route(&self, input: &str) -> Option<&ServiceDefinition> {
        if let Some(code) = menu_code(input) {
            return code.and_then(|c| self.catalog.services().iter().find(|s| s.code == c));
        }
        self.catalog
            .services()
            .iter()
            .find(|service| self.matcher.matches(input, &service.keywords))
    }

    /// Spoken list of every service, in the caller's language
    pub fn menu_options(&self, profile: &LanguageProfile) -> String {
        profile.menu_options(
            self.catalog
                .services()
                .iter()
                .map(|s| (s.code, s.label(&profile.locale))),
        )
    }
}
