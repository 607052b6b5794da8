//! Tutor prompt construction
//!
//! One request per learner turn:
//!
//! ```text
//! system    tutor instructions (topic, languages, JSON answer format)
//! ...       windowed history from the context payload, oldest first
//! user      the new utterance
//! ```

use lingo_core::{ContextPayload, Message};

/// JSON shape the model is asked to answer with
pub const RESPONSE_FORMAT: &str = r#"{
  "reply": "<your conversational answer, one or two sentences, ending with a question>",
  "feedback": "<short critique of the learner's last message; say it was correct if it was>",
  "is_correct": <true|false>,
  "mistakes": [
    {
      "original": "<the exact wrong fragment the learner wrote>",
      "corrected": "<the corrected fragment>",
      "category": "<tense_verb|article_determiner|preposition|word_choice|sentence_structure|fluency_naturalness>",
      "explanation": "<one sentence, in the learner's native language>",
      "severity": "<minor|medium|major>"
    }
  ]
}"#;

/// Builds chat messages for the tutor
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    /// Spoken practice allows missing punctuation and capitalization
    spoken: bool,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self { spoken: true }
    }

    /// Treat input as typed text, so punctuation counts
    pub fn typed(mut self) -> Self {
        self.spoken = false;
        self
    }

    /// Full message list for one turn
    pub fn build(&self, utterance: &str, context: &ContextPayload) -> Vec<Message> {
        let mut messages = Vec::with_capacity(context.history.len() + 2);
        messages.push(Message::system(self.system_prompt(context)));
        messages.extend(context.history.iter().cloned());
        messages.push(Message::user(utterance));
        messages
    }

    /// System prompt for the current topic and language pair
    pub fn system_prompt(&self, context: &ContextPayload) -> String {
        let target = context.languages.target.display_name();
        let native = context.languages.native.display_name();
        let topic = &context.topic;

        let mut topic_line = format!("Topic: {}", topic.name);
        if !topic.description.is_empty() {
            topic_line.push_str(&format!(" ({})", topic.description));
        }

        let input_note = if self.spoken {
            "The learner is speaking, so ignore punctuation, capitalization and filler words."
        } else {
            "The learner is typing, so punctuation and capitalization count."
        };

        format!(
            r#"You are a patient {target} conversation tutor. The learner's native language is {native}.

## Conversation
{topic_line}
Keep the conversation on this topic. Reply in simple, natural {target} and ask one follow-up question.

## Corrections
Check only the learner's latest message. {input_note}
If it has mistakes, list every one in "mistakes" with the exact wrong fragment and its correction.
If it is correct, set "is_correct" to true and leave "mistakes" empty. Do not invent mistakes.
Write "feedback" and explanations in {native}.

## Response Format
Answer with a single JSON object and nothing else:
{format}"#,
            target = target,
            native = native,
            topic_line = topic_line,
            input_note = input_note,
            format = RESPONSE_FORMAT,
        )
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingo_core::{Language, LanguagePair, Role, TopicInfo};

    fn context() -> ContextPayload {
        ContextPayload {
            session_id: "s1".into(),
            topic: TopicInfo::new("travel", "Travel").with_description("Past trips"),
            languages: LanguagePair::new(Language::Spanish, Language::English),
            history: vec![
                Message::user("Fui a Madrid"),
                Message::assistant("¡Qué bien! ¿Qué visitaste?"),
            ],
            turn_index: 2,
        }
    }

    #[test]
    fn test_message_order() {
        let messages = PromptBuilder::new().build("Visité el museo", &context());
        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::User]
        );
        assert_eq!(messages[3].content, "Visité el museo");
    }

    #[test]
    fn test_system_prompt_mentions_topic_and_languages() {
        let prompt = PromptBuilder::new().system_prompt(&context());
        assert!(prompt.contains("Spanish conversation tutor"));
        assert!(prompt.contains("native language is English"));
        assert!(prompt.contains("Topic: Travel (Past trips)"));
        assert!(prompt.contains("\"mistakes\""));
        assert!(prompt.contains("ignore punctuation"));
    }

    #[test]
    fn test_typed_mode() {
        let prompt = PromptBuilder::new().typed().system_prompt(&context());
        assert!(prompt.contains("punctuation and capitalization count"));
    }
}
