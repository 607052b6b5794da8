//! Turn classifier
//!
//! Decides whether a learner utterance contained mistakes, given what the AI
//! tutor said about it. Structured mistake lists are trusted when complete;
//! otherwise the free-text critique is scanned for implicit corrections.

use lingo_core::{
    Mistake, MistakeCategory, ReasonCode, Severity, StructuredMistake, TurnVerdict,
    EXTRACTION_PLACEHOLDER,
};

use super::category::assign_category;
use super::extraction::extract_fragment;
use super::indicators::detect_indicator;

/// Longest explanation copied from the tutor's prose
const MAX_EXPLANATION_CHARS: usize = 300;

/// Classifies one turn from the AI tutor's feedback
#[derive(Debug, Clone, Default)]
pub struct TurnClassifier;

impl TurnClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a turn
    ///
    /// Never fails: an unrecoverable fragment degrades to a placeholder
    /// correction and malformed structured data falls through to pattern
    /// detection.
    pub fn classify(
        &self,
        user_text: &str,
        feedback_text: &str,
        structured: Option<&[StructuredMistake]>,
    ) -> TurnVerdict {
        let feedback = normalize_apostrophes(feedback_text);
        let structured = structured.unwrap_or_default();
        let indicator = detect_indicator(&feedback);

        if !structured.is_empty() && structured.iter().all(|m| m.fragments().is_some()) {
            let mistakes = structured
                .iter()
                .filter_map(|m| normalize_structured(m, &feedback))
                .collect();
            let verdict = TurnVerdict::with_errors(mistakes);
            return match indicator {
                Some(name) => verdict.with_matched_pattern(name),
                None => verdict,
            };
        }

        if !structured.is_empty() {
            tracing::debug!(
                entries = structured.len(),
                "Incomplete structured mistakes, falling back to pattern detection"
            );
        }

        if let Some(name) = indicator {
            return self.classify_from_prose(user_text, &feedback, name);
        }

        let salvaged: Vec<Mistake> = structured
            .iter()
            .filter_map(|m| normalize_structured(m, &feedback))
            .collect();
        if !salvaged.is_empty() {
            return TurnVerdict::with_errors(salvaged);
        }

        TurnVerdict::correct()
    }

    fn classify_from_prose(&self, user_text: &str, feedback: &str, indicator: &str) -> TurnVerdict {
        let original = user_text.trim();
        let explanation = truncate_chars(feedback.trim(), MAX_EXPLANATION_CHARS);

        match extract_fragment(feedback, original) {
            Some(extraction) => {
                let category = assign_category(original, &extraction.fragment, feedback);
                tracing::trace!(
                    indicator,
                    pattern = extraction.pattern,
                    category = category.as_str(),
                    "Extracted correction from feedback"
                );
                let mistake =
                    Mistake::new(category, original, extraction.fragment).with_explanation(explanation);
                TurnVerdict::with_errors(vec![mistake]).with_matched_pattern(indicator)
            }
            None => {
                let category = assign_category(original, "", feedback);
                tracing::debug!(
                    indicator,
                    category = category.as_str(),
                    "Correction detected but no fragment could be extracted"
                );
                let mistake = Mistake::new(category, original, EXTRACTION_PLACEHOLDER)
                    .with_explanation(explanation);
                TurnVerdict::with_errors(vec![mistake])
                    .with_matched_pattern(indicator)
                    .with_reason(ReasonCode::FragmentUnrecoverable)
            }
        }
    }
}

fn normalize_structured(entry: &StructuredMistake, feedback: &str) -> Option<Mistake> {
    let (original, corrected) = entry.fragments()?;
    let explanation = entry
        .explanation
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty());

    let category = entry
        .category
        .as_deref()
        .and_then(MistakeCategory::parse_lenient)
        .unwrap_or_else(|| assign_category(original, corrected, explanation.unwrap_or(feedback)));

    let severity = entry
        .severity
        .as_deref()
        .and_then(Severity::parse)
        .unwrap_or_else(|| category.default_severity());

    let mut mistake = Mistake::new(category, original, corrected).with_severity(severity);
    if let Some(explanation) = explanation {
        mistake = mistake.with_explanation(explanation);
    }
    Some(mistake)
}

fn normalize_apostrophes(text: &str) -> String {
    text.replace(['\u{2019}', '\u{2018}'], "'")
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingo_core::{FeedbackTone, Verdict, PERFECT_FEEDBACK};

    fn classifier() -> TurnClassifier {
        TurnClassifier::new()
    }

    #[test]
    fn test_bold_correction_without_structured_data() {
        let verdict = classifier().classify(
            "I wake up at 7 oclock every day",
            "Almost! It should be **o'clock** with an apostrophe.",
            Some(&[][..]),
        );

        assert_eq!(verdict.verdict, Verdict::HasErrors);
        assert_eq!(verdict.mistakes.len(), 1);
        assert_eq!(verdict.mistakes[0].corrected, "o'clock");
        assert_eq!(verdict.mistakes[0].original, "I wake up at 7 oclock every day");
        assert_eq!(verdict.category, Some(MistakeCategory::SentenceStructure));
        assert_eq!(verdict.matched_pattern.as_deref(), Some("should be"));
        assert_eq!(verdict.tone, FeedbackTone::Warning);
        assert!(verdict.reason.is_none());
    }

    #[test]
    fn test_plain_reply_is_correct() {
        let verdict = classifier().classify("Hello", "Hi there! How are you?", None);
        assert_eq!(verdict.verdict, Verdict::Correct);
        assert_eq!(verdict.feedback, PERFECT_FEEDBACK);
        assert_eq!(verdict.tone, FeedbackTone::Success);
        assert!(verdict.mistakes.is_empty());
        assert!(verdict.category.is_none());
    }

    #[test]
    fn test_structured_data_beats_contradicting_pattern() {
        let structured = vec![StructuredMistake::new("I goed", "I went").with_category("verb tense")];
        let verdict = classifier().classify(
            "I goed to the park",
            "It's more common to say \"I walked to the park\".",
            Some(structured.as_slice()),
        );

        assert_eq!(verdict.mistakes.len(), 1);
        assert_eq!(verdict.mistakes[0].corrected, "I went");
        assert_eq!(verdict.category, Some(MistakeCategory::TenseVerb));
        assert_eq!(verdict.matched_pattern.as_deref(), Some("more common to say"));
    }

    #[test]
    fn test_pattern_wins_over_correct_flag() {
        // the structured flag is not an input; an empty list plus an indicator means HasErrors
        let verdict = classifier().classify(
            "Yesterday I eat pizza",
            "Nice! You could say 'Yesterday I ate pizza'.",
            Some(&[][..]),
        );
        assert_eq!(verdict.verdict, Verdict::HasErrors);
        assert_eq!(verdict.mistakes[0].corrected, "Yesterday I ate pizza");
        assert_eq!(verdict.category, Some(MistakeCategory::TenseVerb));
    }

    #[test]
    fn test_learner_wording_is_not_taken_as_correction() {
        let verdict = classifier().classify(
            "I goed to school",
            "Instead of \"I goed to school\", you should say \"I went to school\".",
            None,
        );
        assert_eq!(verdict.verdict, Verdict::HasErrors);
        assert_eq!(verdict.matched_pattern.as_deref(), Some("instead of"));
        assert_eq!(verdict.mistakes[0].original, "I goed to school");
        assert_eq!(verdict.mistakes[0].corrected, "I went to school");
        assert!(verdict.reason.is_none());
    }

    #[test]
    fn test_unrecoverable_fragment_uses_placeholder() {
        let verdict = classifier().classify(
            "I goed to school",
            "Not quite, think about the past tense of that verb.",
            None,
        );
        assert_eq!(verdict.verdict, Verdict::HasErrors);
        assert_eq!(verdict.mistakes[0].corrected, EXTRACTION_PLACEHOLDER);
        assert_eq!(verdict.reason, Some(ReasonCode::FragmentUnrecoverable));
        assert_eq!(verdict.category, Some(MistakeCategory::TenseVerb));
    }

    #[test]
    fn test_fluency_suggestion_is_info() {
        let verdict = classifier().classify(
            "I am agree with you",
            "Great point! It's more natural to say \"I agree with you\".",
            None,
        );
        assert_eq!(verdict.category, Some(MistakeCategory::FluencyNaturalness));
        assert_eq!(verdict.tone, FeedbackTone::Info);
        assert!(!verdict.counts_against_score());
    }

    #[test]
    fn test_malformed_structured_falls_through_to_patterns() {
        let structured = vec![
            StructuredMistake::new("a apple", "an apple"),
            StructuredMistake {
                original: Some("in Monday".into()),
                ..Default::default()
            },
        ];
        let verdict = classifier().classify(
            "I eat a apple in Monday",
            "Don't forget the article: **an apple**.",
            Some(structured.as_slice()),
        );
        assert_eq!(verdict.mistakes.len(), 1);
        assert_eq!(verdict.mistakes[0].corrected, "an apple");
        assert_eq!(verdict.matched_pattern.as_deref(), Some("don't forget"));
    }

    #[test]
    fn test_malformed_structured_without_signal_salvages_complete_entries() {
        let structured = vec![
            StructuredMistake::new("a apple", "an apple").with_explanation("Use 'an' before a vowel sound."),
            StructuredMistake::default(),
        ];
        let verdict = classifier().classify("I eat a apple", "Yum, apples are great!", Some(structured.as_slice()));
        assert_eq!(verdict.verdict, Verdict::HasErrors);
        assert_eq!(verdict.mistakes.len(), 1);
        assert_eq!(verdict.mistakes[0].explanation, "Use 'an' before a vowel sound.");
    }

    #[test]
    fn test_structured_category_missing_uses_rules() {
        let structured = vec![StructuredMistake::new("in Monday", "on Monday")
            .with_explanation("Days of the week take the preposition 'on'.")];
        let verdict = classifier().classify("See you in Monday", "See you then!", Some(structured.as_slice()));
        assert_eq!(verdict.category, Some(MistakeCategory::Preposition));
        assert_eq!(verdict.mistakes[0].severity, Severity::Minor);
    }

    #[test]
    fn test_structured_severity_is_respected() {
        let mut entry = StructuredMistake::new("He go", "He goes").with_category("grammar");
        entry.severity = Some("high".into());
        let verdict = classifier().classify("He go to work", "", Some(&[entry][..]));
        assert_eq!(verdict.mistakes[0].severity, Severity::Major);
    }

    #[test]
    fn test_curly_apostrophes_are_normalized() {
        let verdict = classifier().classify(
            "I forget my keys yesterday",
            "Don\u{2019}t forget: it should be \u{201C}I forgot my keys yesterday\u{201D}.",
            None,
        );
        assert_eq!(verdict.matched_pattern.as_deref(), Some("should be"));
        assert_eq!(verdict.mistakes[0].corrected, "I forgot my keys yesterday");
        assert_eq!(verdict.category, Some(MistakeCategory::TenseVerb));
    }

    #[test]
    fn test_structured_json_from_model() {
        let json = r#"[{"original": "I have 20 years", "corrected": "I am 20 years old", "type": "word choice"}]"#;
        let structured: Vec<StructuredMistake> = serde_json::from_str(json).unwrap();
        let verdict = classifier().classify("I have 20 years", "", Some(structured.as_slice()));
        assert_eq!(verdict.category, Some(MistakeCategory::WordChoice));
    }

    #[test]
    fn test_long_explanation_is_truncated() {
        let feedback = format!("Not quite. {}", "x".repeat(400));
        let verdict = classifier().classify("I goed", &feedback, None);
        assert!(verdict.mistakes[0].explanation.ends_with("..."));
        assert_eq!(verdict.mistakes[0].explanation.chars().count(), MAX_EXPLANATION_CHARS + 3);
    }
}
