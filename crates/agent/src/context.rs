//! Conversation context assembly

use lingo_core::{ContextPayload, LanguagePair, TopicInfo, Turn};

/// Default number of prior turns sent to the AI
pub const DEFAULT_HISTORY_WINDOW: usize = 10;

/// Builds the per-turn payload for the AI collaborator
///
/// Pure: the same inputs always give the same payload.
#[derive(Debug, Clone, Copy)]
pub struct ContextBuilder {
    history_window: usize,
}

impl ContextBuilder {
    pub fn new(history_window: usize) -> Self {
        Self { history_window }
    }

    pub fn history_window(&self) -> usize {
        self.history_window
    }

    /// Payload for turn `turn_index` given the turns before it
    pub fn build(
        &self,
        session_id: &str,
        topic: &TopicInfo,
        languages: LanguagePair,
        history: &[Turn],
        turn_index: u32,
    ) -> ContextPayload {
        let start = history.len().saturating_sub(self.history_window);
        let history = history[start..].iter().flat_map(Turn::to_messages).collect();

        ContextPayload {
            session_id: session_id.to_string(),
            topic: topic.clone(),
            languages,
            history,
            turn_index,
        }
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingo_core::{AiFeedback, Language, Role, TurnVerdict};

    fn turns(n: u32) -> Vec<Turn> {
        (1..=n)
            .map(|i| {
                let ai = AiFeedback::text("").with_reply(format!("reply {}", i));
                Turn::new(i, format!("utterance {}", i), &ai, TurnVerdict::correct())
            })
            .collect()
    }

    #[test]
    fn test_history_is_windowed() {
        let builder = ContextBuilder::new(2);
        let topic = TopicInfo::new("travel", "Travel");
        let languages = LanguagePair::new(Language::Spanish, Language::English);
        let payload = builder.build("s1", &topic, languages, &turns(5), 6);

        assert_eq!(payload.turn_index, 6);
        assert_eq!(payload.languages.target, Language::Spanish);
        assert_eq!(payload.history.len(), 4);
        assert_eq!(payload.history[0].role, Role::User);
        assert_eq!(payload.history[0].content, "utterance 4");
        assert_eq!(payload.history[3].content, "reply 5");
    }

    #[test]
    fn test_empty_reply_is_skipped() {
        let builder = ContextBuilder::default();
        let history = vec![Turn::fallback(1, "Hello")];
        let payload =
            builder.build("s1", &TopicInfo::new("t", "T"), LanguagePair::default(), &history, 2);
        assert_eq!(payload.history.len(), 1);
    }

    #[test]
    fn test_builder_is_pure() {
        let builder = ContextBuilder::default();
        let topic = TopicInfo::new("food", "Food");
        let history = turns(3);
        let a = builder.build("s1", &topic, LanguagePair::default(), &history, 4);
        let b = builder.build("s1", &topic, LanguagePair::default(), &history, 4);
        assert_eq!(a, b);
    }
}
