//! Keyword matching strategy
//!
//! Language detection and service routing both reduce to "does this
//! utterance contain any of these keywords". The strategy sits behind a
//! trait so a classifier can replace it without touching the state machine.

use unicode_segmentation::UnicodeSegmentation;

/// Decides whether an utterance mentions any keyword of a set
pub trait KeywordMatcher: Send + Sync {
    fn matches(&self, utterance: &str, keywords: &[String]) -> bool;
}

/// Case-insensitive whole-word matcher
///
/// Keywords may span several words ("front desk", "that's all"); they match
/// when the same word sequence appears in the utterance. Keywords written in
/// scripts without word spacing (Japanese, Chinese) fall back to substring
/// search.
#[derive(Debug, Default, Clone, Copy)]
pub struct WordMatcher;

impl WordMatcher {
    pub fn new() -> Self {
        Self
    }
}

impl KeywordMatcher for WordMatcher {
    fn matches(&self, utterance: &str, keywords: &[String]) -> bool {
        let lowered = utterance.to_lowercase();
        let words: Vec<&str> = lowered.unicode_words().collect();

        keywords
            .iter()
            .any(|keyword| keyword_matches(&lowered, &words, keyword))
    }
}

fn keyword_matches(lowered: &str, words: &[&str], keyword: &str) -> bool {
    let keyword = keyword.trim().to_lowercase();
    if keyword.is_empty() {
        return false;
    }
    if is_unspaced(&keyword) {
        return lowered.contains(&keyword);
    }

    let needle: Vec<&str> = keyword.unicode_words().collect();
    if needle.is_empty() || needle.len() > words.len() {
        return false;
    }
    words.windows(needle.len()).any(|window| window == needle.as_slice())
}

/// CJK ideographs and kana
fn is_unspaced(text: &str) -> bool {
    text.chars().any(|c| {
        matches!(c,
            '\u{2E80}'..='\u{9FFF}'
            | '\u{F900}'..='\u{FAFF}'
            | '\u{FF66}'..='\u{FF9F}')
    })
}
