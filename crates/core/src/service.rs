//! Hotel service catalog entries

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A routable hotel service ("room service", "front desk", ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    /// Menu digit, 1-based catalog position
    pub code: u32,
    /// Canonical English name, stored in the session
    pub name: String,
    /// Spoken name per locale
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Routing keywords matched against the caller's words
    #[serde(default)]
    pub keywords: Vec<String>,
    /// What the assistant does for this service; folded into the system instruction
    pub description: String,
}

impl ServiceDefinition {
    /// Name to speak in `locale`, the canonical name when no label exists
    pub fn label(&self, locale: &str) -> &str {
        self.labels
            .get(locale)
            .map(String::as_str)
            .unwrap_or(&self.name)
    }

    /// System instruction fragment for this service
    pub fn instruction(&self) -> String {
        format!(
            "You are a helpful {} assistant in a hotel. {}",
            self.name, self.description
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn housekeeping() -> ServiceDefinition {
        ServiceDefinition {
            code: 4,
            name: "housekeeping".into(),
            labels: BTreeMap::from([("es-ES".to_string(), "limpieza".to_string())]),
            keywords: vec!["towels".into()],
            description: "Bring towels.".into(),
        }
    }

    #[test]
    fn test_label_falls_back_to_name() {
        let service = housekeeping();
        assert_eq!(service.label("es-ES"), "limpieza");
        assert_eq!(service.label("de-DE"), "housekeeping");
    }

    #[test]
    fn test_instruction() {
        let instruction = housekeeping().instruction();
        assert!(instruction.starts_with("You are a helpful housekeeping assistant"));
        assert!(instruction.ends_with("Bring towels."));
    }
}
