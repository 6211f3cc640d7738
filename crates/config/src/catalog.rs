//! Hotel catalog
//!
//! Static, immutable data loaded once at startup: supported languages with
//! their localized prompts, routable services, the room directory and known
//! caller numbers. A built-in catalog is embedded from `config/catalog.yaml`;
//! deployments can point `catalog_path` at their own file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use hotel_voice_core::{LanguageChoice, LanguageProfile, ServiceDefinition, DEFAULT_CALLER_NAME};

use crate::ConfigError;

const BUILTIN_CATALOG: &str = include_str!("../../../config/catalog.yaml");

/// Room directory entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomRecord {
    pub guest: String,
    pub status: String,
    #[serde(default)]
    pub balance: f64,
}

/// Catalog file contents before validation
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogFile {
    persona: String,
    #[serde(default = "default_language_code")]
    default_language: u32,
    languages: Vec<LanguageProfile>,
    services: Vec<ServiceDefinition>,
    #[serde(default)]
    rooms: BTreeMap<String, RoomRecord>,
    #[serde(default)]
    known_callers: BTreeMap<String, String>,
}

fn default_language_code() -> u32 {
    1
}

/// Everything the dialogue needs to know about the hotel
///
/// Only constructed through validation, so there is always at least one
/// language and the default code resolves.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "CatalogFile", into = "CatalogFile")]
pub struct HotelCatalog {
    /// Base persona for the assistant's system instruction
    persona: String,
    /// Code of the language used before the caller picks one
    default_language: u32,
    languages: Vec<LanguageProfile>,
    services: Vec<ServiceDefinition>,
    rooms: BTreeMap<String, RoomRecord>,
    /// Caller number (E.164) to display name
    known_callers: BTreeMap<String, String>,
    /// Position of the default language in `languages`
    default_index: usize,
}

impl TryFrom<CatalogFile> for HotelCatalog {
    type Error = ConfigError;

    fn try_from(file: CatalogFile) -> Result<Self, Self::Error> {
        let mut catalog = HotelCatalog {
            persona: file.persona,
            default_language: file.default_language,
            languages: file.languages,
            services: file.services,
            rooms: file.rooms,
            known_callers: file.known_callers,
            default_index: 0,
        };
        catalog.validate()?;
        catalog.default_index = catalog
            .languages
            .iter()
            .position(|l| l.code == catalog.default_language)
            .unwrap_or(0);
        Ok(catalog)
    }
}

impl From<HotelCatalog> for CatalogFile {
    fn from(catalog: HotelCatalog) -> Self {
        CatalogFile {
            persona: catalog.persona,
            default_language: catalog.default_language,
            languages: catalog.languages,
            services: catalog.services,
            rooms: catalog.rooms,
            known_callers: catalog.known_callers,
        }
    }
}

impl HotelCatalog {
    /// The catalog shipped with the binary
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_yaml(BUILTIN_CATALOG)
    }

    /// Load from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileNotFound(format!("{}: {}", path.display(), e)))?;
        let catalog = Self::from_yaml(&content)?;

        tracing::info!(
            path = %path.display(),
            languages = catalog.languages.len(),
            services = catalog.services.len(),
            rooms = catalog.rooms.len(),
            "Loaded hotel catalog"
        );
        Ok(catalog)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let file: CatalogFile =
            serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        HotelCatalog::try_from(file)
    }

    /// Check menu codes and keyword sets
    ///
    /// Codes must be 1..=n in catalog order so a keypad digit maps straight
    /// to a catalog position.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.languages.is_empty() {
            return Err(ConfigError::MissingField("languages".to_string()));
        }
        if self.services.is_empty() {
            return Err(ConfigError::MissingField("services".to_string()));
        }

        for (idx, language) in self.languages.iter().enumerate() {
            let field = format!("languages[{}]", idx);
            check_code(&field, language.code, idx)?;
            if language.keywords.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field,
                    message: format!("'{}' has no selection keywords", language.name),
                });
            }
        }

        for (idx, service) in self.services.iter().enumerate() {
            let field = format!("services[{}]", idx);
            check_code(&field, service.code, idx)?;
            if service.keywords.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field,
                    message: format!("'{}' has no routing keywords", service.name),
                });
            }
            if self.services[..idx].iter().any(|s| s.name == service.name) {
                return Err(ConfigError::InvalidValue {
                    field,
                    message: format!("duplicate service name '{}'", service.name),
                });
            }
        }

        if self.language(self.default_language).is_none() {
            return Err(ConfigError::InvalidValue {
                field: "default_language".to_string(),
                message: format!("no language with code {}", self.default_language),
            });
        }

        Ok(())
    }

    pub fn languages(&self) -> &[LanguageProfile] {
        &self.languages
    }

    pub fn services(&self) -> &[ServiceDefinition] {
        &self.services
    }

    pub fn language(&self, code: u32) -> Option<&LanguageProfile> {
        self.languages.iter().find(|l| l.code == code)
    }

    pub fn persona(&self) -> &str {
        &self.persona
    }

    pub fn default_language(&self) -> &LanguageProfile {
        &self.languages[self.default_index]
    }

    /// Profile behind a session's language, default if the code is unknown
    pub fn language_for(&self, choice: &LanguageChoice) -> &LanguageProfile {
        self.language(choice.code)
            .unwrap_or_else(|| self.default_language())
    }

    pub fn service_by_name(&self, name: &str) -> Option<&ServiceDefinition> {
        self.services.iter().find(|s| s.name == name)
    }

    pub fn room(&self, number: &str) -> Option<&RoomRecord> {
        self.rooms.get(number)
    }

    /// Display name for a caller number, "guest" when unknown
    pub fn caller_name(&self, caller: &str) -> String {
        self.known_callers
            .get(caller.trim())
            .cloned()
            .unwrap_or_else(|| DEFAULT_CALLER_NAME.to_string())
    }
}

fn check_code(field: &str, code: u32, idx: usize) -> Result<(), ConfigError> {
    let expected = idx as u32 + 1;
    if code != expected {
        return Err(ConfigError::InvalidValue {
            field: format!("{}.code", field),
            message: format!("expected {}, got {}", expected, code),
        });
    }
    Ok(())
}
