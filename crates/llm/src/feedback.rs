//! LLM-backed feedback provider
//!
//! Prompts the backend with the tutor instructions and parses its answer.
//! Models are asked for a JSON object, but the parser also accepts the object
//! inside a markdown fence or surrounded by prose. Anything that is not JSON
//! becomes free-text feedback with no structured data, which the turn
//! classifier then scans for implicit corrections.

use std::sync::Arc;

use async_trait::async_trait;
use lingo_core::{AiFeedback, ContextPayload, FeedbackProvider, Result, StructuredMistake};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::backend::LlmBackend;
use crate::prompt::PromptBuilder;
use crate::LlmError;

static FENCED_JSON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json|JSON)?\s*(\{.*?\})\s*```").unwrap());

/// [`FeedbackProvider`] over any [`LlmBackend`]
pub struct LlmFeedbackProvider {
    backend: Arc<dyn LlmBackend>,
    prompts: PromptBuilder,
    name: String,
}

impl LlmFeedbackProvider {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        let name = format!("llm/{}", backend.model_name());
        Self {
            backend,
            prompts: PromptBuilder::default(),
            name,
        }
    }

    pub fn with_prompts(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }
}

#[async_trait]
impl FeedbackProvider for LlmFeedbackProvider {
    async fn send(&self, utterance: &str, context: &ContextPayload) -> Result<AiFeedback> {
        let messages = self.prompts.build(utterance, context);
        let result = self.backend.generate(&messages).await?;

        tracing::debug!(
            session_id = %context.session_id,
            turn = context.turn_index,
            model = self.backend.model_name(),
            tokens = result.tokens,
            latency_ms = result.total_time_ms,
            "LLM feedback received"
        );

        if result.text.trim().is_empty() {
            return Err(LlmError::InvalidResponse("empty completion".to_string()).into());
        }

        Ok(parse_tutor_response(&result.text))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// What the tutor prompt asks the model to return
#[derive(Debug, Deserialize)]
struct TutorResponse {
    #[serde(default, alias = "response", alias = "message")]
    reply: Option<String>,
    #[serde(default, alias = "feedback_text", alias = "critique")]
    feedback: Option<String>,
    #[serde(default, alias = "correct")]
    is_correct: Option<bool>,
    #[serde(default, alias = "errors", alias = "corrections")]
    mistakes: Option<Vec<StructuredMistake>>,
}

/// Parse a raw completion into [`AiFeedback`]
pub fn parse_tutor_response(raw: &str) -> AiFeedback {
    let raw = raw.trim();

    let parsed = json_candidate(raw).and_then(|json| {
        serde_json::from_str::<TutorResponse>(json)
            .map_err(|e| tracing::debug!(error = %e, "LLM answer is not valid tutor JSON"))
            .ok()
    });

    match parsed {
        Some(response) => AiFeedback {
            reply: response.reply.unwrap_or_default().trim().to_string(),
            feedback_text: response.feedback.unwrap_or_default().trim().to_string(),
            structured_mistakes: response.mistakes,
            structured_verdict: response.is_correct,
        },
        None => AiFeedback::text(raw).with_reply(raw),
    }
}

/// The JSON object inside a completion, if there appears to be one
fn json_candidate(raw: &str) -> Option<&str> {
    if let Some(fenced) = FENCED_JSON.captures(raw).and_then(|c| c.get(1)) {
        return Some(fenced.as_str());
    }
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start < end).then(|| &raw[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{FinishReason, GenerationResult};
    use lingo_core::{LanguagePair, Message, TopicInfo};
    use std::sync::Mutex;

    #[test]
    fn test_parse_plain_json() {
        let raw = r#"{
            "reply": "Nice! What do you eat for breakfast?",
            "feedback": "Small fix: it should be \"I wake up at 7 o'clock\".",
            "is_correct": false,
            "mistakes": [
                {"original": "7 oclock", "corrected": "7 o'clock", "category": "sentence_structure", "severity": "minor"}
            ]
        }"#;

        let feedback = parse_tutor_response(raw);
        assert_eq!(feedback.reply, "Nice! What do you eat for breakfast?");
        assert!(feedback.feedback_text.starts_with("Small fix"));
        assert_eq!(feedback.structured_verdict, Some(false));

        let mistakes = feedback.structured_mistakes.unwrap();
        assert_eq!(mistakes.len(), 1);
        assert_eq!(mistakes[0].fragments(), Some(("7 oclock", "7 o'clock")));
        assert_eq!(mistakes[0].severity.as_deref(), Some("minor"));
    }

    #[test]
    fn test_parse_fenced_json_with_aliases() {
        let raw = "Here is my answer:\n```json\n{\"response\": \"Hi there!\", \"critique\": \"Perfect.\", \"correct\": true, \"errors\": []}\n```\nThanks!";

        let feedback = parse_tutor_response(raw);
        assert_eq!(feedback.reply, "Hi there!");
        assert_eq!(feedback.feedback_text, "Perfect.");
        assert_eq!(feedback.structured_verdict, Some(true));
        assert_eq!(feedback.structured_mistakes, Some(vec![]));
    }

    #[test]
    fn test_parse_embedded_json() {
        let raw = r#"Sure. {"reply": "Tell me more.", "feedback": "Good job", "mistakes": null} Hope that helps."#;
        let feedback = parse_tutor_response(raw);
        assert_eq!(feedback.reply, "Tell me more.");
        assert_eq!(feedback.structured_mistakes, None);
        assert_eq!(feedback.structured_verdict, None);
    }

    #[test]
    fn test_non_json_becomes_free_text() {
        let raw = "  Great job! Instead of \"goed\", you should say \"went\".  ";
        let feedback = parse_tutor_response(raw);
        assert_eq!(feedback.feedback_text, raw.trim());
        assert_eq!(feedback.reply, raw.trim());
        assert!(feedback.structured_mistakes.is_none());
        assert!(feedback.structured_verdict.is_none());
    }

    #[test]
    fn test_broken_json_becomes_free_text() {
        let raw = r#"{"reply": "Hi", "feedback": "unterminated"#;
        let feedback = parse_tutor_response(raw);
        assert_eq!(feedback.feedback_text, raw);
        assert!(feedback.structured_mistakes.is_none());
    }

    struct FakeBackend {
        answer: String,
        seen: Mutex<Vec<Message>>,
    }

    #[async_trait]
    impl LlmBackend for FakeBackend {
        async fn generate(
            &self,
            messages: &[Message],
        ) -> std::result::Result<GenerationResult, LlmError> {
            *self.seen.lock().unwrap() = messages.to_vec();
            Ok(GenerationResult {
                text: self.answer.clone(),
                tokens: 12,
                total_time_ms: 5,
                finish_reason: FinishReason::Stop,
            })
        }

        async fn is_available(&self) -> bool {
            true
        }

        fn model_name(&self) -> &str {
            "fake"
        }
    }

    fn context() -> ContextPayload {
        ContextPayload {
            session_id: "s1".into(),
            topic: TopicInfo::new("daily_routine", "Daily Routine"),
            languages: LanguagePair::default(),
            history: vec![],
            turn_index: 1,
        }
    }

    #[tokio::test]
    async fn test_provider_prompts_and_parses() {
        let backend = Arc::new(FakeBackend {
            answer: r#"{"reply": "Cool!", "feedback": "Correct.", "is_correct": true, "mistakes": []}"#
                .to_string(),
            seen: Mutex::default(),
        });
        let provider = LlmFeedbackProvider::new(backend.clone());
        assert_eq!(provider.name(), "llm/fake");

        let feedback = provider.send("I wake up early", &context()).await.unwrap();
        assert_eq!(feedback.reply, "Cool!");
        assert_eq!(feedback.structured_verdict, Some(true));

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1], Message::user("I wake up early"));
    }

    #[tokio::test]
    async fn test_empty_completion_is_an_error() {
        let backend = Arc::new(FakeBackend {
            answer: "   ".to_string(),
            seen: Mutex::default(),
        });
        let provider = LlmFeedbackProvider::new(backend);

        let err = provider.send("Hello", &context()).await.unwrap_err();
        assert!(err.is_ai_failure());
    }
}
