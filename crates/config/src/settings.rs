//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{dialogue, endpoints, gather, llm, ESCALATION_KEYWORDS};
use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    #[serde(default)]
    pub server: ServerConfig,

    /// AI backend configuration
    #[serde(default)]
    pub llm: LlmSettings,

    #[serde(default)]
    pub dialogue: DialogueConfig,

    /// Parameters of the transport's input gathering
    #[serde(default)]
    pub gather: GatherConfig,

    #[serde(default)]
    pub language: LanguageConfig,

    #[serde(default)]
    pub escalation: EscalationConfig,

    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// YAML catalog replacing the built-in one
    #[serde(default)]
    pub catalog_path: Option<String>,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Path the transport posts each turn to; used as the gather action
    #[serde(default = "default_turn_path")]
    pub turn_path: String,

    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    5000
}
fn default_turn_path() -> String {
    "/voice/turn".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            turn_path: default_turn_path(),
            cors_enabled: true,
            cors_origins: Vec::new(),
        }
    }
}

/// AI backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    /// Defaults to the `XAI_API_KEY` environment variable
    #[serde(default = "default_llm_api_key")]
    pub api_key: Option<String>,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Hard limit for one backend call, fallback reply after that
    #[serde(default = "default_llm_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_llm_endpoint() -> String {
    endpoints::LLM_DEFAULT.to_string()
}
fn default_llm_api_key() -> Option<String> {
    std::env::var(endpoints::LLM_API_KEY_ENV)
        .ok()
        .filter(|k| !k.is_empty())
}
fn default_llm_model() -> String {
    endpoints::LLM_DEFAULT_MODEL.to_string()
}
fn default_temperature() -> f32 {
    llm::TEMPERATURE
}
fn default_max_tokens() -> usize {
    llm::MAX_TOKENS
}
fn default_llm_timeout_ms() -> u64 {
    llm::TIMEOUT_MS
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            api_key: default_llm_api_key(),
            model: default_llm_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_ms: default_llm_timeout_ms(),
        }
    }
}

/// Dialogue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueConfig {
    /// Non-system messages kept in history and sent to the model
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Exact length of a room number
    #[serde(default = "default_identity_digits")]
    pub identity_digits: usize,

    /// Keypad key that ends the conversation
    #[serde(default = "default_finish_on_key")]
    pub finish_on_key: String,
}

fn default_history_window() -> usize {
    dialogue::HISTORY_WINDOW
}
fn default_identity_digits() -> usize {
    dialogue::IDENTITY_DIGITS
}
fn default_finish_on_key() -> String {
    dialogue::FINISH_ON_KEY.to_string()
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            identity_digits: default_identity_digits(),
            finish_on_key: default_finish_on_key(),
        }
    }
}

/// Input gathering parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatherConfig {
    /// Seconds of silence before the transport gives up waiting
    #[serde(default = "default_gather_timeout")]
    pub timeout_secs: u32,

    #[serde(default = "default_speech_timeout")]
    pub speech_timeout: String,
}

fn default_gather_timeout() -> u32 {
    gather::TIMEOUT_SECS
}
fn default_speech_timeout() -> String {
    gather::SPEECH_TIMEOUT.to_string()
}

impl Default for GatherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_gather_timeout(),
            speech_timeout: default_speech_timeout(),
        }
    }
}

/// Language selection behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageConfig {
    /// Re-ask the language menu on unrecognised speech instead of
    /// falling back to the default language
    #[serde(default = "default_true")]
    pub reprompt_on_unknown: bool,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            reprompt_on_unknown: true,
        }
    }
}

/// Human hand-off configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationConfig {
    #[serde(default = "default_escalation_keywords")]
    pub keywords: Vec<String>,

    /// End the automated conversation as soon as a keyword is heard.
    /// When false the model is told to escalate politely instead.
    #[serde(default = "default_true")]
    pub auto_handoff: bool,

    /// Staff number the call is transferred to on hand-off
    #[serde(default)]
    pub transfer_number: Option<String>,
}

fn default_escalation_keywords() -> Vec<String> {
    ESCALATION_KEYWORDS.iter().map(|k| k.to_string()).collect()
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            keywords: default_escalation_keywords(),
            auto_handoff: true,
            transfer_number: None,
        }
    }
}

/// Session store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    File,
}

/// Session persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Directory for the file backend
    #[serde(default = "default_session_dir")]
    pub directory: String,
}

fn default_session_dir() -> String {
    "data/sessions".to_string()
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            directory: default_session_dir(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_llm()?;
        self.validate_dialogue()?;

        if self.escalation.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(invalid("escalation.keywords", "At least one keyword is required"));
        }

        if self.persistence.backend == StoreBackend::File
            && self.persistence.directory.trim().is_empty()
        {
            return Err(invalid(
                "persistence.directory",
                "Directory is required for the file backend",
            ));
        }

        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(invalid("server.port", "Port cannot be 0"));
        }
        if !self.server.turn_path.starts_with('/') {
            return Err(invalid("server.turn_path", "Must start with '/'"));
        }
        Ok(())
    }

    fn validate_llm(&self) -> Result<(), ConfigError> {
        let llm = &self.llm;

        if !(0.0..=2.0).contains(&llm.temperature) {
            return Err(invalid(
                "llm.temperature",
                format!("Must be between 0.0 and 2.0, got {}", llm.temperature),
            ));
        }
        if llm.max_tokens == 0 {
            return Err(invalid("llm.max_tokens", "Must be at least 1"));
        }
        if llm.timeout_ms == 0 {
            return Err(invalid("llm.timeout_ms", "Must be at least 1"));
        }

        if self.environment.is_production() && llm.api_key.is_none() {
            return Err(invalid(
                "llm.api_key",
                format!("Must be set in production (or export {})", endpoints::LLM_API_KEY_ENV),
            ));
        }
        Ok(())
    }

    fn validate_dialogue(&self) -> Result<(), ConfigError> {
        let dialogue = &self.dialogue;

        if dialogue.history_window == 0 {
            return Err(invalid("dialogue.history_window", "Must be at least 1"));
        }
        if !(1..=8).contains(&dialogue.identity_digits) {
            return Err(invalid(
                "dialogue.identity_digits",
                format!("Must be between 1 and 8, got {}", dialogue.identity_digits),
            ));
        }

        let key = dialogue.finish_on_key.as_str();
        let valid_key = key.len() == 1 && key.chars().all(|c| c.is_ascii_digit() || c == '#' || c == '*');
        if !valid_key {
            return Err(invalid(
                "dialogue.finish_on_key",
                format!("Must be a single keypad key, got '{}'", key),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.into(),
    }
}

/// Load settings from `config/` and the environment
///
/// Priority: `HOTEL_VOICE__*` env vars > `config/{env}` > `config/default`.
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Load settings rooted at `config_dir`
pub fn load_settings_from(config_dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::from(config_dir.join("default")).required(false));

    if let Some(env_name) = env {
        builder = builder.add_source(File::from(config_dir.join(env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("HOTEL_VOICE")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("escalation.keywords")
            .with_list_parse_key("server.cors_origins")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    tracing::debug!(
        environment = ?settings.environment,
        store = ?settings.persistence.backend,
        "Settings loaded"
    );

    Ok(settings)
}
