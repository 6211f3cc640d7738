//! Backend construction from settings

use std::sync::Arc;
use std::time::Duration;

use hotel_voice_config::LlmSettings;

use crate::backend::{LlmBackend, OpenAIBackend, OpenAIConfig};
use crate::LlmError;

impl From<&LlmSettings> for OpenAIConfig {
    fn from(settings: &LlmSettings) -> Self {
        Self {
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            timeout: Duration::from_millis(settings.timeout_ms),
        }
    }
}

/// Build the chat backend described by `settings`
pub fn create_backend(settings: &LlmSettings) -> Result<Arc<dyn LlmBackend>, LlmError> {
    let backend = OpenAIBackend::new(OpenAIConfig::from(settings))?;
    tracing::info!(
        endpoint = %settings.endpoint,
        model = %settings.model,
        "LLM backend configured"
    );
    Ok(Arc::new(backend))
}
