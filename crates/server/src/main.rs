//! Language Tutor Server Entry Point

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use lingo_agent::SessionLifecycle;
use lingo_config::{load_settings, Settings, TopicCatalog};
use lingo_core::SessionRecorder;
use lingo_llm::{LlmFactory, LlmFeedbackProvider};
use lingo_persistence::{InMemoryRecorder, ScyllaConfig};
use lingo_server::{create_router, init_metrics, lifecycle_config, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Priority: env vars > config/{env}.yaml > config/default.yaml > defaults
    let env = std::env::var("LINGO_TUTOR_ENV").ok();
    let config = match load_settings(env.as_deref()) {
        Ok(settings) => {
            // Tracing not yet initialized
            eprintln!(
                "Loaded configuration from files (env: {})",
                env.as_deref().unwrap_or("default")
            );
            settings
        }
        Err(e) => {
            eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
            Settings::default()
        }
    };

    init_tracing(&config);

    tracing::info!("Starting Language Tutor v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        environment = ?config.environment,
        config_path = env.as_deref().unwrap_or("default"),
        "Configuration loaded"
    );

    let metrics_handle = if config.observability.metrics_enabled {
        let handle = init_metrics();
        if handle.is_some() {
            tracing::info!("Initialized Prometheus metrics at /metrics");
        }
        handle
    } else {
        None
    };

    let topics = Arc::new(TopicCatalog::from_settings(&config));
    tracing::info!(topics = topics.len(), "Topic catalog loaded");

    let backend = LlmFactory::create_backend(&config.llm)?;
    let provider = Arc::new(LlmFeedbackProvider::new(backend.clone()));

    let recorder = init_recorder(&config).await;

    let lifecycle = Arc::new(SessionLifecycle::new(
        lifecycle_config(&config.session),
        topics,
        provider,
        recorder,
    ));
    let cleanup = lifecycle.start_cleanup_task();

    let state = AppState::new(lifecycle.clone(), config.clone())
        .with_llm(backend)
        .with_metrics(metrics_handle);

    tracing::info!(
        durable = lifecycle.is_durable(),
        max_sessions = config.session.max_sessions,
        "Initialized application state"
    );

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = cleanup.send(true);
    tracing::info!(
        remaining_sessions = lifecycle.count(),
        "Server shutdown complete"
    );
    Ok(())
}

/// ScyllaDB recorder when enabled, in-memory otherwise or on failure
async fn init_recorder(config: &Settings) -> Arc<dyn SessionRecorder> {
    if !config.persistence.enabled {
        tracing::info!("Persistence disabled, using in-memory recorder");
        return Arc::new(InMemoryRecorder::new());
    }

    tracing::info!("Initializing ScyllaDB persistence layer...");
    let scylla_config = ScyllaConfig {
        hosts: config.persistence.scylla_hosts.clone(),
        keyspace: config.persistence.keyspace.clone(),
        replication_factor: config.persistence.replication_factor,
        ..Default::default()
    };

    match lingo_persistence::init(scylla_config).await {
        Ok(recorder) => {
            tracing::info!(
                hosts = ?config.persistence.scylla_hosts,
                keyspace = %config.persistence.keyspace,
                "ScyllaDB persistence initialized"
            );
            Arc::new(recorder)
        }
        Err(e) => {
            tracing::error!(
                "Failed to initialize ScyllaDB: {}. Falling back to in-memory.",
                e
            );
            Arc::new(InMemoryRecorder::new())
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

fn init_tracing(config: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.observability.log_level;
        format!("lingo_tutor={level},lingo_server={level},lingo_agent={level},tower_http=debug")
            .into()
    });

    let fmt_layer = if config.observability.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
