//! Language profiles and localized prompt templates

use serde::{Deserialize, Serialize};

/// Static catalog entry for one supported call language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageProfile {
    /// Menu digit, 1-based catalog position
    pub code: u32,
    /// Display name used in the language menu ("Spanish")
    pub name: String,
    /// BCP-47 locale handed to the speech renderer ("es-ES")
    pub locale: String,
    /// Voice identifier handed to the speech renderer
    pub voice: String,
    /// Words that explicitly select this language ("two", "spanish")
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Words that reveal the caller is speaking this language ("hola")
    #[serde(default)]
    pub detection_keywords: Vec<String>,
    /// Phrases that end the conversation
    #[serde(default)]
    pub farewell_phrases: Vec<String>,
    /// Words asking for staff, on top of the configured escalation keywords
    #[serde(default)]
    pub escalation_keywords: Vec<String>,
    pub templates: PromptTemplates,
}

/// Localized prompt texts
///
/// Placeholders are written `{name}` and substituted with [`fill`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptTemplates {
    /// `{caller}`
    pub greeting: String,
    /// `{options}`
    pub language_menu: String,
    /// `{code}`, `{name}`
    pub option: String,
    /// Joins the last two menu options
    pub conjunction: String,
    /// `{caller}`
    pub welcome: String,
    pub identity_prompt: String,
    /// `{room}`
    pub identity_ack: String,
    /// `{guest}`, `{balance}`
    pub room_details: String,
    /// `{options}`
    pub service_menu: String,
    /// `{options}`
    pub service_reprompt: String,
    /// `{service}`
    pub service_connected: String,
    pub follow_up: String,
    pub goodbye: String,
    pub escalation: String,
    pub fallback: String,
    pub apology: String,
    /// Instruction telling the model which language to answer in
    pub respond_in: String,
}

impl LanguageProfile {
    /// Render a numbered menu: "1 for English, 2 for Spanish or 3 for French"
    pub fn menu_options<'a, I>(&self, entries: I) -> String
    where
        I: IntoIterator<Item = (u32, &'a str)>,
    {
        let options: Vec<String> = entries
            .into_iter()
            .map(|(code, name)| {
                let code = code.to_string();
                fill(&self.templates.option, &[("code", code.as_str()), ("name", name)])
            })
            .collect();

        match options.split_last() {
            None => String::new(),
            Some((last, [])) => last.clone(),
            Some((last, rest)) => {
                format!("{} {} {}", rest.join(", "), self.templates.conjunction, last)
            },
        }
    }
}

/// Substitute `{key}` placeholders in a template
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{}}}", key), value);
    }
    out
}
