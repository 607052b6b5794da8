//! HTTP Endpoints
//!
//! REST API for practice sessions.

use std::time::Duration;

use axum::{
    extract::{Json, Path, State},
    http::{HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use lingo_agent::{SessionInfo, SessionReport, StartedSession, TurnResult};
use serde::Deserialize;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::metrics::{self, metrics_handler};
use crate::state::AppState;
use crate::ServerError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let server = &state.settings.server;
    let cors_layer = build_cors_layer(&server.cors_origins, server.cors_enabled);
    let timeout = Duration::from_secs(server.timeout_seconds);

    Router::new()
        // Practice sessions
        .route("/api/sessions", post(start_session))
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id/turns", post(submit_turn))
        .route("/api/sessions/:id/end", post(end_session))
        .route("/api/topics", get(list_topics))
        // Health
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // Prometheus metrics
        .route("/metrics", get(metrics_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(timeout))
                .layer(CompressionLayer::new())
                .layer(cors_layer),
        )
        .with_state(state)
}

/// CORS from configured origins
///
/// - disabled: no cross-origin access
/// - enabled with no origins: any origin
/// - otherwise the configured origins; unparseable entries are skipped
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        return CorsLayer::new();
    }

    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if origins.is_empty() {
        tracing::info!("No CORS origins configured, allowing any origin");
        return base.allow_origin(Any);
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    base.allow_origin(parsed_origins)
}

#[derive(Debug, Deserialize)]
struct StartSessionRequest {
    user_id: String,
    topic_id: String,
}

/// `POST /api/sessions`
async fn start_session(
    State(state): State<AppState>,
    Json(request): Json<StartSessionRequest>,
) -> Result<(StatusCode, Json<StartedSession>), ServerError> {
    let started = state
        .lifecycle
        .start_session(&request.user_id, &request.topic_id)
        .await?;
    Ok((StatusCode::CREATED, Json(started)))
}

#[derive(Debug, Deserialize)]
struct TurnRequest {
    text: String,
}

/// `POST /api/sessions/:id/turns`
async fn submit_turn(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<TurnRequest>,
) -> Result<Json<TurnResult>, ServerError> {
    let result = state.lifecycle.submit_turn(&id, &request.text).await?;
    metrics::record_turn(&result);
    Ok(Json(result))
}

/// `POST /api/sessions/:id/end`
///
/// Ending an already-ended session returns the same report.
async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionReport>, ServerError> {
    Ok(Json(state.lifecycle.end_session(&id).await?))
}

/// `GET /api/sessions/:id`
async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionInfo>, ServerError> {
    Ok(Json(state.lifecycle.session_info(&id).await?))
}

/// `GET /api/topics`
async fn list_topics(State(state): State<AppState>) -> Json<serde_json::Value> {
    let topics = state.lifecycle.topics();
    Json(serde_json::json!({
        "count": topics.len(),
        "topics": topics,
    }))
}

/// `GET /health`
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let lifecycle = &state.lifecycle;
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": {
            "total": lifecycle.count(),
            "active": lifecycle.active_count(),
        },
        "persistence": if lifecycle.is_durable() { "scylla" } else { "memory" },
    }))
}

/// `GET /ready`: checks the LLM backend
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let (ready, llm_status) = match &state.llm {
        None => (true, "not_configured"),
        Some(backend) => {
            match tokio::time::timeout(Duration::from_secs(2), backend.is_available()).await {
                Ok(true) => (true, "ok"),
                Ok(false) => (false, "unreachable"),
                Err(_) => (false, "timeout"),
            }
        }
    };

    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(serde_json::json!({
            "status": if ready { "ready" } else { "not_ready" },
            "checks": {
                "llm_backend": llm_status,
            },
        })),
    )
}
