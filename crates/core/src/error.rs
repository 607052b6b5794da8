//! Error types shared across the tutor crates

use thiserror::Error;

/// Core error type
///
/// Collaborator implementations (LLM, persistence, topic catalog) convert their
/// own errors into this type at the trait boundary.
#[derive(Error, Debug)]
pub enum Error {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Feedback provider error: {0}")]
    Feedback(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Topic not found: {0}")]
    TopicNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether the error came from the AI collaborator (and is recoverable by fallback)
    pub fn is_ai_failure(&self) -> bool {
        matches!(self, Error::Llm(_) | Error::Feedback(_) | Error::Timeout(_))
    }
}

/// Result alias using the core error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_failure_classification() {
        assert!(Error::Llm("connection refused".into()).is_ai_failure());
        assert!(Error::Timeout("8s".into()).is_ai_failure());
        assert!(!Error::Persistence("write failed".into()).is_ai_failure());
        assert!(!Error::TopicNotFound("daily-routine".into()).is_ai_failure());
    }
}
