//! Fluency estimation
//!
//! Placeholder collaborator: real fluency scoring would need audio or a
//! dedicated model. The default heuristic rewards longer utterances.

use lingo_core::Turn;
use unicode_segmentation::UnicodeSegmentation;

/// Scores a session's fluency in 0..=100
pub trait FluencyEstimator: Send + Sync {
    fn estimate(&self, turns: &[Turn]) -> u8;

    fn name(&self) -> &str;
}

/// Average words per utterance relative to a target length
///
/// Heuristic only. Sessions without turns score 100.
#[derive(Debug, Clone)]
pub struct WordCountFluency {
    target_words: f64,
}

impl WordCountFluency {
    pub const DEFAULT_TARGET_WORDS: usize = 8;

    pub fn new(target_words: usize) -> Self {
        Self {
            target_words: target_words.max(1) as f64,
        }
    }
}

impl Default for WordCountFluency {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TARGET_WORDS)
    }
}

impl FluencyEstimator for WordCountFluency {
    fn estimate(&self, turns: &[Turn]) -> u8 {
        if turns.is_empty() {
            return 100;
        }
        let words: usize = turns.iter().map(|t| t.user_text.unicode_words().count()).sum();
        let average = words as f64 / turns.len() as f64;
        (average / self.target_words * 100.0).round().min(100.0) as u8
    }

    fn name(&self) -> &str {
        "word_count"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turns(texts: &[&str]) -> Vec<Turn> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| Turn::fallback(i as u32 + 1, *t))
            .collect()
    }

    #[test]
    fn test_no_turns_is_100() {
        assert_eq!(WordCountFluency::default().estimate(&[]), 100);
    }

    #[test]
    fn test_average_relative_to_target() {
        let estimator = WordCountFluency::new(8);
        // 2 and 6 words, average 4 of 8
        assert_eq!(estimator.estimate(&turns(&["Hello there", "I like to eat pizza daily"])), 50);
    }

    #[test]
    fn test_punctuation_is_not_a_word() {
        let estimator = WordCountFluency::new(4);
        // "Well , I - agree !" is 3 words, not 5 whitespace tokens
        assert_eq!(estimator.estimate(&turns(&["Well , I - agree !"])), 75);
    }

    #[test]
    fn test_capped_at_100() {
        let estimator = WordCountFluency::new(2);
        assert_eq!(estimator.estimate(&turns(&["I went to the market yesterday"])), 100);
    }
}
