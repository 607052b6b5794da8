//! Correction indicator phrases
//!
//! Tutors rarely say "that is wrong". They hint: "it's more natural to say",
//! "remember to", or they bold the fixed word. Any of these means the turn
//! carried a correction even when the structured mistake list came back empty.

use once_cell::sync::Lazy;
use regex::Regex;

/// Indicator phrases in priority order. The first one found wins.
const PHRASES: &[&str] = &[
    "instead of",
    "should be",
    "should say",
    "should use",
    "you could say",
    "you can say",
    "you might say",
    "more common to say",
    "more natural to say",
    "it would be",
    "the correct form",
    "the correct way",
    "correct sentence",
    "better to say",
    "we usually say",
    "try saying",
    "a better way",
    "small correction",
    "minor correction",
    "quick correction",
    "correction:",
    "remember to",
    "don't forget",
    "you meant",
    "not quite",
];

/// Name reported for bold markup around a word
pub const BOLD_MARKUP: &str = "bold_markup";

static INDICATORS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    let mut table: Vec<(&'static str, Regex)> = PHRASES
        .iter()
        .map(|phrase| {
            let pattern = regex::escape(phrase).replace(' ', r"\s+");
            (*phrase, Regex::new(&format!(r"(?i)\b{}", pattern)).unwrap())
        })
        .collect();
    table.push((
        BOLD_MARKUP,
        Regex::new(r"\*\*[\p{L}\p{N}'-]+(?:\s+[\p{L}\p{N}'-]+){0,4}\*\*").unwrap(),
    ));
    table
});

/// First indicator found in `feedback`, by table order
///
/// Curly apostrophes must already be normalized to `'`.
pub fn detect_indicator(feedback: &str) -> Option<&'static str> {
    INDICATORS
        .iter()
        .find(|(_, re)| re.is_match(feedback))
        .map(|(name, _)| *name)
}

/// Indicator names in evaluation order
pub fn indicator_names() -> impl Iterator<Item = &'static str> {
    INDICATORS.iter().map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phrase_detection_is_case_insensitive() {
        assert_eq!(detect_indicator("It's MORE NATURAL TO SAY this"), Some("more natural to say"));
        assert_eq!(detect_indicator("Don't forget the article!"), Some("don't forget"));
        assert_eq!(detect_indicator("Correction: I went"), Some("correction:"));
    }

    #[test]
    fn test_first_indicator_in_table_order_wins() {
        // "should be" precedes "remember to" in the table regardless of text position
        let text = "Remember to use the past tense. It should be 'went'.";
        assert_eq!(detect_indicator(text), Some("should be"));
    }

    #[test]
    fn test_bold_markup() {
        assert_eq!(detect_indicator("Great, but **was** fits better."), Some(BOLD_MARKUP));
        assert_eq!(detect_indicator("Say **o'clock** here."), Some(BOLD_MARKUP));
        assert_eq!(detect_indicator("Nice **"), None);
    }

    #[test]
    fn test_plain_replies_have_no_indicator() {
        assert_eq!(detect_indicator("Hi there! How are you?"), None);
        assert_eq!(detect_indicator("That sounds like a lovely trip."), None);
        // word boundary: "instead" alone is not a correction
        assert_eq!(detect_indicator("I stayed home instead."), None);
    }

    #[test]
    fn test_table_size() {
        let names: Vec<_> = indicator_names().collect();
        assert_eq!(names.len(), PHRASES.len() + 1);
        assert_eq!(names.last(), Some(&BOLD_MARKUP));
    }
}
