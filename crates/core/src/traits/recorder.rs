//! Persistence collaborator

use async_trait::async_trait;

use crate::{FinalScores, Mistake, Result, Turn};

/// Durable record of practice sessions
///
/// Implementations:
/// - `ScyllaPracticeRecorder` - ScyllaDB tables
/// - `InMemoryRecorder` - process-local, used when persistence is disabled
///
/// Errors are logged by the caller and never roll back in-memory session
/// state.
#[async_trait]
pub trait SessionRecorder: Send + Sync {
    /// Persist a completed turn
    async fn save_turn(&self, session_id: &str, turn: &Turn) -> Result<()>;

    /// Persist one mistake of a turn
    async fn save_mistake(
        &self,
        session_id: &str,
        turn_sequence: u32,
        mistake: &Mistake,
    ) -> Result<()>;

    /// Mark a session complete with its final scores
    async fn complete_session(
        &self,
        session_id: &str,
        scores: &FinalScores,
        duration_seconds: u64,
    ) -> Result<()>;

    /// Whether records survive a restart
    fn is_durable(&self) -> bool;
}
