//! Language Tutor Server
//!
//! HTTP API over the practice session lifecycle, plus health and Prometheus
//! metrics endpoints.

pub mod http;
pub mod metrics;
pub mod state;

pub use http::create_router;
pub use metrics::{init_metrics, record_turn};
pub use state::{lifecycle_config, AppState};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lingo_agent::LifecycleError;
use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("No active session: {0}")]
    NoActiveSession(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Server at capacity: {0}")]
    Capacity(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Stable machine-readable code for response bodies
    pub fn code(&self) -> &'static str {
        match self {
            ServerError::SessionNotFound(_) => "session_not_found",
            ServerError::NoActiveSession(_) => "no_active_session",
            ServerError::NotFound(_) => "not_found",
            ServerError::InvalidRequest(_) => "invalid_request",
            ServerError::Capacity(_) => "capacity_reached",
            ServerError::Internal(_) => "internal",
        }
    }
}

impl From<&ServerError> for StatusCode {
    fn from(err: &ServerError) -> Self {
        match err {
            ServerError::SessionNotFound(_) | ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::NoActiveSession(_) => StatusCode::CONFLICT,
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Capacity(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServerError> for StatusCode {
    fn from(err: ServerError) -> Self {
        StatusCode::from(&err)
    }
}

impl From<LifecycleError> for ServerError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::SessionNotFound(id) => ServerError::SessionNotFound(id),
            LifecycleError::NoActiveSession(id) => ServerError::NoActiveSession(id),
            LifecycleError::InvalidInput(msg) => ServerError::InvalidRequest(msg),
            LifecycleError::TopicNotFound(topic) => {
                ServerError::NotFound(format!("topic {}", topic))
            }
            LifecycleError::CapacityReached(max) => {
                ServerError::Capacity(format!("{} sessions", max))
            }
            LifecycleError::Core(e) => ServerError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = StatusCode::from(&self);
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        crate::metrics::record_error(self.code());

        let body = serde_json::json!({
            "error": self.code(),
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
