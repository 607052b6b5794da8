//! Persistence for the language tutor
//!
//! Provides [`lingo_core::SessionRecorder`] implementations:
//! - `ScyllaPracticeRecorder` - turns, mistakes and session completions in ScyllaDB
//! - `InMemoryRecorder` - process-local, used when persistence is disabled

pub mod client;
pub mod error;
pub mod memory;
pub mod practice;
pub mod schema;

pub use client::{ScyllaClient, ScyllaConfig};
pub use error::PersistenceError;
pub use memory::{CompletedSession, InMemoryRecorder};
pub use practice::ScyllaPracticeRecorder;

/// Connect, ensure the schema and return the ScyllaDB recorder
pub async fn init(config: ScyllaConfig) -> Result<ScyllaPracticeRecorder, PersistenceError> {
    let client = ScyllaClient::connect(config).await?;
    client.ensure_schema().await?;
    Ok(ScyllaPracticeRecorder::new(client))
}
