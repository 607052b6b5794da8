//! AI feedback collaborator

use async_trait::async_trait;

use crate::{AiFeedback, ContextPayload, Result};

/// Sends one learner utterance to the AI tutor
///
/// Implementations:
/// - `LlmFeedbackProvider` - prompts an LLM backend and parses its JSON answer
///
/// Calls may fail or hang; callers are expected to apply a timeout and fall
/// back to a neutral verdict rather than surfacing the error.
///
/// # Example
///
/// ```ignore
/// let provider: Arc<dyn FeedbackProvider> = Arc::new(LlmFeedbackProvider::new(backend));
/// let feedback = provider.send("I goed to school", &context).await?;
/// println!("{}", feedback.feedback_text);
/// ```
#[async_trait]
pub trait FeedbackProvider: Send + Sync + 'static {
    /// Get feedback for an utterance
    async fn send(&self, utterance: &str, context: &ContextPayload) -> Result<AiFeedback>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LanguagePair, TopicInfo};

    struct EchoProvider;

    #[async_trait]
    impl FeedbackProvider for EchoProvider {
        async fn send(&self, utterance: &str, context: &ContextPayload) -> Result<AiFeedback> {
            Ok(AiFeedback::text(format!("turn {}: {}", context.turn_index, utterance)))
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    #[tokio::test]
    async fn test_provider_is_object_safe() {
        let provider: Box<dyn FeedbackProvider> = Box::new(EchoProvider);
        let context = ContextPayload {
            session_id: "s1".into(),
            topic: TopicInfo::new("greetings", "Greetings"),
            languages: LanguagePair::default(),
            history: Vec::new(),
            turn_index: 2,
        };

        let feedback = provider.send("Hello", &context).await.unwrap();
        assert_eq!(feedback.feedback_text, "turn 2: Hello");
        assert_eq!(provider.name(), "echo");
    }
}
