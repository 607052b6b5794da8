//! Prometheus metrics
//!
//! Recording goes through the `metrics` facade; without an installed
//! recorder every call is a no-op, which keeps tests free of global state.
//! Session start and end counters are emitted by the lifecycle itself.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use lingo_agent::TurnResult;
use lingo_core::ReasonCode;
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

use crate::state::AppState;

const AI_LATENCY_BUCKETS: &[f64] = &[0.25, 0.5, 1.0, 2.0, 4.0, 8.0, 15.0, 30.0];

/// Install the Prometheus recorder
///
/// Returns `None` (and logs) if a recorder is already installed.
pub fn init_metrics() -> Option<PrometheusHandle> {
    let builder = match PrometheusBuilder::new().set_buckets_for_metric(
        Matcher::Full("lingo_ai_latency_seconds".to_string()),
        AI_LATENCY_BUCKETS,
    ) {
        Ok(builder) => builder,
        Err(e) => {
            tracing::warn!(error = %e, "Invalid histogram buckets, using defaults");
            PrometheusBuilder::new()
        }
    };

    match builder.install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install Prometheus recorder");
            None
        }
    }
}

/// `GET /metrics`
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics disabled\n".to_string()),
    }
}

/// Turn verdict, fallback and extraction-miss counters plus AI latency
pub fn record_turn(result: &TurnResult) {
    metrics::counter!("lingo_turns_total", "verdict" => result.turn.verdict.as_str()).increment(1);

    if result.fallback {
        metrics::counter!("lingo_ai_fallbacks_total").increment(1);
    }
    if result.turn.reason == Some(ReasonCode::FragmentUnrecoverable) {
        metrics::counter!("lingo_extraction_misses_total").increment(1);
    }
    if let Some(category) = result.turn.category {
        metrics::counter!("lingo_mistakes_total", "category" => category.as_str()).increment(1);
    }

    metrics::histogram!("lingo_ai_latency_seconds").record(result.ai_latency_ms as f64 / 1000.0);
}

pub fn record_error(code: &'static str) {
    metrics::counter!("lingo_http_errors_total", "code" => code).increment(1);
}
