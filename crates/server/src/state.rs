//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;
use std::time::Duration;

use lingo_agent::{LifecycleConfig, SessionLifecycle};
use lingo_config::{SessionConfig, Settings};
use lingo_llm::LlmBackend;
use metrics_exporter_prometheus::PrometheusHandle;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub lifecycle: Arc<SessionLifecycle>,
    pub settings: Arc<Settings>,
    /// Backend checked by `/ready`; absent when the provider is not LLM-based
    pub llm: Option<Arc<dyn LlmBackend>>,
    /// Prometheus handle, `None` when metrics are disabled
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(lifecycle: Arc<SessionLifecycle>, settings: Settings) -> Self {
        Self {
            lifecycle,
            settings: Arc::new(settings),
            llm: None,
            metrics: None,
        }
    }

    pub fn with_llm(mut self, backend: Arc<dyn LlmBackend>) -> Self {
        self.llm = Some(backend);
        self
    }

    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }
}

/// Lifecycle limits from the `session` settings section
pub fn lifecycle_config(session: &SessionConfig) -> LifecycleConfig {
    LifecycleConfig {
        max_sessions: session.max_sessions,
        session_timeout: Duration::from_secs(session.session_timeout_secs),
        cleanup_interval: Duration::from_secs(session.cleanup_interval_secs),
        ai_timeout: Duration::from_millis(session.ai_timeout_ms),
        history_window: session.history_window,
        max_utterance_chars: session.max_utterance_chars,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_config_from_settings() {
        let session = SessionConfig {
            ai_timeout_ms: 1500,
            history_window: 4,
            ..Default::default()
        };
        let config = lifecycle_config(&session);
        assert_eq!(config.ai_timeout, Duration::from_millis(1500));
        assert_eq!(config.history_window, 4);
        assert_eq!(config.max_sessions, session.max_sessions);
    }
}
