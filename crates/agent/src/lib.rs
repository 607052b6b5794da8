//! Practice Session Framework
//!
//! Features:
//! - Session lifecycle (`Idle -> Active -> Ended`) with one active session per user
//! - Per-turn AI feedback with timeout and neutral fallback
//! - Turn classification via `lingo_text_processing`
//! - Running accuracy score per session
//! - End-of-session reports with category breakdown and suggestions
//! - Background cleanup of idle sessions

pub mod context;
pub mod fluency;
pub mod lifecycle;
pub mod report;
pub mod score;
pub mod session;

pub use context::{ContextBuilder, DEFAULT_HISTORY_WINDOW};
pub use fluency::{FluencyEstimator, WordCountFluency};
pub use lifecycle::{
    EndCause, LifecycleConfig, SessionInfo, SessionLifecycle, StartedSession, TurnResult,
};
pub use report::{CategoryCount, ReportGenerator, ScoreBand, SessionReport};
pub use score::{ScoreState, ScoreTracker};
pub use session::{PracticeSession, SessionPhase};

use thiserror::Error;

/// Lifecycle errors surfaced to callers
#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("No active session: {0}")]
    NoActiveSession(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Topic not found: {0}")]
    TopicNotFound(String),

    #[error("Session capacity reached ({0})")]
    CapacityReached(usize),

    #[error(transparent)]
    Core(lingo_core::Error),
}

impl From<lingo_core::Error> for LifecycleError {
    fn from(err: lingo_core::Error) -> Self {
        match err {
            lingo_core::Error::TopicNotFound(topic) => LifecycleError::TopicNotFound(topic),
            lingo_core::Error::InvalidInput(msg) => LifecycleError::InvalidInput(msg),
            other => LifecycleError::Core(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_conversion() {
        let err: LifecycleError = lingo_core::Error::TopicNotFound("space".into()).into();
        assert!(matches!(err, LifecycleError::TopicNotFound(t) if t == "space"));

        let err: LifecycleError = lingo_core::Error::Persistence("down".into()).into();
        assert!(matches!(err, LifecycleError::Core(_)));
    }
}
