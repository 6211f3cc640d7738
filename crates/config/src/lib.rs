//! Configuration management for the hotel voice line
//!
//! Supports loading configuration from:
//! - YAML/TOML files under `config/`
//! - Environment variables (`HOTEL_VOICE__` prefix)
//!
//! The hotel catalog (languages, services, rooms, known callers) is separate
//! from settings and lives in `config/catalog.yaml`.

pub mod catalog;
pub mod constants;
pub mod settings;

pub use catalog::{HotelCatalog, RoomRecord};
pub use settings::{
    load_settings, load_settings_from, DialogueConfig, EscalationConfig, GatherConfig,
    LanguageConfig, LlmSettings, ObservabilityConfig, PersistenceConfig, RuntimeEnvironment,
    ServerConfig, Settings, StoreBackend,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
