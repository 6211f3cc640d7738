//! Application State
//!
//! Shared state across all handlers.

use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use hotel_voice_agent::{AgentConfig, TurnController, TurnHandler};
use hotel_voice_config::{HotelCatalog, Settings};
use hotel_voice_llm::LlmBackend;
use hotel_voice_persistence::SessionStore;

use crate::twiml::GatherOptions;
use crate::ServerError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    /// Runs dialogue turns
    pub handler: Arc<dyn TurnHandler>,
    pub store: Arc<dyn SessionStore>,
    /// Checked by the readiness endpoint
    pub backend: Arc<dyn LlmBackend>,
    pub gather: Arc<GatherOptions>,
    pub metrics: PrometheusHandle,
}

impl AppState {
    /// State backed by a `TurnController` built from settings
    pub fn new(
        settings: Settings,
        catalog: HotelCatalog,
        store: Arc<dyn SessionStore>,
        backend: Arc<dyn LlmBackend>,
        metrics: PrometheusHandle,
    ) -> Result<Self, ServerError> {
        let controller = TurnController::new(
            Arc::new(catalog),
            store.clone(),
            backend.clone(),
            AgentConfig::from(&settings),
        )?;

        Ok(Self::with_handler(
            settings,
            Arc::new(controller),
            store,
            backend,
            metrics,
        ))
    }

    /// State with a custom turn handler
    pub fn with_handler(
        settings: Settings,
        handler: Arc<dyn TurnHandler>,
        store: Arc<dyn SessionStore>,
        backend: Arc<dyn LlmBackend>,
        metrics: PrometheusHandle,
    ) -> Self {
        Self {
            gather: Arc::new(GatherOptions::from_settings(&settings)),
            settings: Arc::new(settings),
            handler,
            store,
            backend,
            metrics,
        }
    }
}
