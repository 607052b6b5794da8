//! Backend selection from settings
//!
//! ```ignore
//! let provider = LlmFactory::create_provider(&settings.llm)?;
//! let feedback = provider.send("I goed to school", &context).await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use lingo_config::{LlmProvider, LlmSettings};
use lingo_core::FeedbackProvider;

use crate::backend::{LlmBackend, LlmConfig, OllamaBackend, OpenAIBackend};
use crate::feedback::LlmFeedbackProvider;
use crate::LlmError;

/// Factory for LLM backends and the feedback provider built on them
pub struct LlmFactory;

impl LlmFactory {
    /// Backend config for the configured provider
    pub fn backend_config(settings: &LlmSettings) -> LlmConfig {
        LlmConfig {
            model: settings.model.clone(),
            endpoint: settings.endpoint().to_string(),
            api_key: settings.api_key.clone(),
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            timeout: Duration::from_secs(settings.timeout_secs),
            max_retries: settings.max_retries,
            ..Default::default()
        }
    }

    /// Create a raw backend
    pub fn create_backend(settings: &LlmSettings) -> Result<Arc<dyn LlmBackend>, LlmError> {
        let mut config = Self::backend_config(settings);

        match settings.provider {
            LlmProvider::Ollama => Ok(Arc::new(OllamaBackend::new(config)?)),
            LlmProvider::OpenAi => {
                if config.api_key.is_none() {
                    config.api_key = std::env::var("OPENAI_API_KEY").ok();
                }
                Ok(Arc::new(OpenAIBackend::new(config)?))
            }
        }
    }

    /// Create the tutor feedback provider
    pub fn create_provider(settings: &LlmSettings) -> Result<Arc<dyn FeedbackProvider>, LlmError> {
        let backend = Self::create_backend(settings)?;
        tracing::info!(
            provider = ?settings.provider,
            model = backend.model_name(),
            endpoint = settings.endpoint(),
            "LLM backend configured"
        );
        Ok(Arc::new(LlmFeedbackProvider::new(backend)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_config_from_settings() {
        let settings = LlmSettings {
            model: "llama3.1:8b".to_string(),
            timeout_secs: 12,
            ..Default::default()
        };
        let config = LlmFactory::backend_config(&settings);
        assert_eq!(config.model, "llama3.1:8b");
        assert_eq!(config.endpoint, "http://localhost:11434");
        assert_eq!(config.timeout, Duration::from_secs(12));
    }

    #[test]
    fn test_create_ollama_provider() {
        let provider = LlmFactory::create_provider(&LlmSettings::default()).unwrap();
        assert!(provider.name().starts_with("llm/"));
    }

    #[test]
    fn test_local_openai_compatible_needs_no_key() {
        let settings = LlmSettings {
            provider: LlmProvider::OpenAi,
            endpoint: Some("http://localhost:8000/v1".to_string()),
            ..Default::default()
        };
        let backend = LlmFactory::create_backend(&settings).unwrap();
        assert_eq!(backend.model_name(), settings.model);
    }
}
