//! LLM integration for the tutor
//!
//! Features:
//! - Ollama and OpenAI-compatible chat backends with retry and backoff
//! - Tutor prompt construction from the per-turn context
//! - `FeedbackProvider` implementation that parses the model's JSON answer

pub mod backend;
pub mod factory;
pub mod feedback;
pub mod prompt;

pub use backend::{
    FinishReason, GenerationResult, LlmBackend, LlmConfig, OllamaBackend, OpenAIBackend,
};
pub use factory::LlmFactory;
pub use feedback::{parse_tutor_response, LlmFeedbackProvider};
pub use prompt::PromptBuilder;

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Generation error: {0}")]
    Generation(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for lingo_core::Error {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Timeout => lingo_core::Error::Timeout("LLM request".to_string()),
            other => lingo_core::Error::Llm(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_map_to_ai_failures() {
        let core: lingo_core::Error = LlmError::Api("bad request".into()).into();
        assert!(core.is_ai_failure());
        assert!(matches!(core, lingo_core::Error::Llm(_)));

        let core: lingo_core::Error = LlmError::Timeout.into();
        assert!(matches!(core, lingo_core::Error::Timeout(_)));
    }
}
