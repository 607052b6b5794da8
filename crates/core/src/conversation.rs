//! Conversation records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::feedback::{
    AiFeedback, FeedbackTone, Mistake, MistakeCategory, ReasonCode, TurnVerdict, Verdict,
};
use crate::llm_types::Message;

/// One user-utterance / AI-response exchange
///
/// Turns are append-only: once built they are never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// 1-based position within the session
    pub sequence: u32,
    /// What the learner said or typed
    pub user_text: String,
    /// The tutor's conversational reply
    pub reply: String,
    /// Raw AI feedback text the verdict was derived from
    pub ai_feedback_text: String,
    pub verdict: Verdict,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mistakes: Vec<Mistake>,
    /// Short display feedback
    pub feedback: String,
    pub tone: FeedbackTone,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<MistakeCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ReasonCode>,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Build a turn from the AI response and the classifier verdict
    pub fn new(
        sequence: u32,
        user_text: impl Into<String>,
        ai: &AiFeedback,
        verdict: TurnVerdict,
    ) -> Self {
        Self {
            sequence,
            user_text: user_text.into(),
            reply: ai.reply.clone(),
            ai_feedback_text: ai.feedback_text.clone(),
            verdict: verdict.verdict,
            mistakes: verdict.mistakes,
            feedback: verdict.feedback,
            tone: verdict.tone,
            category: verdict.category,
            matched_pattern: verdict.matched_pattern,
            reason: verdict.reason,
            timestamp: Utc::now(),
        }
    }

    /// Turn recorded after the AI collaborator failed
    pub fn fallback(sequence: u32, user_text: impl Into<String>) -> Self {
        Self::new(sequence, user_text, &AiFeedback::default(), TurnVerdict::fallback())
    }

    pub fn is_correct(&self) -> bool {
        self.verdict == Verdict::Correct
    }

    /// Whether this turn increments the session's incorrect counter
    pub fn counts_against_score(&self) -> bool {
        match (self.verdict, self.category) {
            (Verdict::Correct, _) => false,
            (Verdict::HasErrors, Some(category)) => category.counts_against_score(),
            (Verdict::HasErrors, None) => true,
        }
    }

    /// Whether this turn was produced by the AI-failure fallback path
    pub fn is_fallback(&self) -> bool {
        self.reason == Some(ReasonCode::AiUnavailable)
    }

    /// The exchange as chat messages (user utterance, then tutor reply if any)
    pub fn to_messages(&self) -> Vec<Message> {
        let mut messages = vec![Message::user(self.user_text.clone())];
        if !self.reply.is_empty() {
            messages.push(Message::assistant(self.reply.clone()));
        }
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::MistakeCategory;

    #[test]
    fn test_turn_from_verdict() {
        let ai = AiFeedback::text("You should say 'I went'.").with_reply("Where did you go?");
        let verdict = TurnVerdict::with_errors(vec![Mistake::new(
            MistakeCategory::TenseVerb,
            "I go yesterday",
            "I went yesterday",
        )]);
        let turn = Turn::new(1, "I go to the park yesterday", &ai, verdict);

        assert_eq!(turn.sequence, 1);
        assert_eq!(turn.verdict, Verdict::HasErrors);
        assert_eq!(turn.category, Some(MistakeCategory::TenseVerb));
        assert_eq!(turn.to_messages().len(), 2);
        assert!(!turn.is_fallback());
    }

    #[test]
    fn test_fallback_turn() {
        let turn = Turn::fallback(3, "Hello");
        assert!(turn.is_correct());
        assert!(turn.is_fallback());
        assert_eq!(turn.tone, FeedbackTone::Info);
        // No reply, so only the user side goes into history
        assert_eq!(turn.to_messages(), vec![Message::user("Hello")]);
    }
}
