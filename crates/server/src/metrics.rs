//! Prometheus metrics
//!
//! Turn counters and latency are recorded through the `metrics` facade and
//! exported by the Prometheus recorder at `/metrics`.

use axum::{extract::State, http::header, response::IntoResponse};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

use hotel_voice_agent::TurnOutcome;
use hotel_voice_core::Stage;

use crate::state::AppState;

/// Install the global Prometheus recorder
///
/// A second call (e.g. several servers in one test binary) gets a detached
/// handle that renders nothing.
pub fn init_metrics() -> PrometheusHandle {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            describe_counter!("hotel_voice_turns_total", "Turns handled, by entry stage");
            describe_counter!(
                "hotel_voice_turn_outcomes_total",
                "Turns handled, by outcome"
            );
            describe_histogram!("hotel_voice_turn_latency_ms", "Turn latency in milliseconds");
            describe_counter!(
                "hotel_voice_call_status_total",
                "Call status callbacks, by status"
            );
            handle
        },
        Err(e) => {
            tracing::warn!(error = %e, "Metrics recorder already installed");
            detached_handle()
        },
    }
}

/// Handle of a recorder that is not installed globally
pub fn detached_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}

pub fn record_turn(stage: Stage, outcome: TurnOutcome, elapsed: Duration) {
    counter!("hotel_voice_turns_total", "stage" => stage.as_str()).increment(1);
    counter!("hotel_voice_turn_outcomes_total", "outcome" => outcome.as_str()).increment(1);
    histogram!("hotel_voice_turn_latency_ms").record(elapsed.as_secs_f64() * 1000.0);
}

pub fn record_call_status(status: &str) {
    counter!("hotel_voice_call_status_total", "status" => status.to_string()).increment(1);
}

pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
