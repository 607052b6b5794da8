//! Corrected-fragment extraction
//!
//! Once an indicator says the tutor corrected something, these patterns try to
//! pull out the corrected wording. They are evaluated in order and the first
//! pattern yielding a usable fragment wins. Each entry is a named regex so
//! it can be tested on its own.
//!
//! A candidate is unusable when it is empty, when it is introduced by
//! "instead of" (the tutor quoting the learner), or when it repeats the
//! learner's utterance. The search then moves on to the next candidate.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// A quoted span: straight double quotes, curly double quotes, or single
/// quotes. Inside single quotes an apostrophe followed by a letter (o'clock,
/// don't) does not close the span.
const QUOTED: &str = r#"(?:"([^"\n]+)"|“([^”\n]+)”|'((?:[^'\n]|'\w)+)')"#;

/// Verbs whose presence marks a quoted span as a full clause
const CLAUSE_VERBS: &str = "am|is|are|was|were|be|been|have|has|had|do|does|did|go|goes|went|\
                            will|would|can|could|get|got|like|liked|want|wanted|need|make|made";

/// A successful extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Name of the pattern that produced the fragment
    pub pattern: &'static str,
    pub fragment: String,
}

/// Lead-in that marks the following span as the learner's own wording
static QUOTING_LEARNER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:instead\s+of|rather\s+than)\s*[:,]?\s*$").unwrap());

static CASCADE: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    vec![
        (
            "more_common_to_say",
            Regex::new(&format!(
                r"(?i)more\s+(?:common|natural|usual)\s+to\s+say\s*[:,]?\s*{}",
                QUOTED
            ))
            .unwrap(),
        ),
        (
            "it_would_be",
            Regex::new(&format!(r"(?i)\bit\s+would\s+be\s*[:,]?\s*{}", QUOTED)).unwrap(),
        ),
        ("bold_span", Regex::new(r"\*\*([^*\n]+)\*\*").unwrap()),
        (
            "quoted_first_person",
            Regex::new(r#""((?:I|My|We|Our)\b[^"\n]*)"|“((?:I|My|We|Our)\b[^”\n]*)”"#).unwrap(),
        ),
        (
            "you_could_say",
            Regex::new(&format!(
                r"(?i)\byou\s+(?:could|can|might)\s+(?:also\s+)?say\s*[:,]?\s*(?:{}|([^.!?\n]+))",
                QUOTED
            ))
            .unwrap(),
        ),
        (
            "quoted_with_verb",
            Regex::new(&format!(
                r#"(?i)"([^"\n]*\b(?:{v})\b[^"\n]*)"|“([^”\n]*\b(?:{v})\b[^”\n]*)”"#,
                v = CLAUSE_VERBS
            ))
            .unwrap(),
        ),
        (
            "it_was_is",
            Regex::new(r#"\b(It\s+(?:was|is)\s+[^.!?\n"”*]+)"#).unwrap(),
        ),
        (
            "bulleted_quoted",
            Regex::new(&format!(r"(?m)^\s*(?:[-*•]|\d+[.)])\s+{}", QUOTED)).unwrap(),
        ),
        (
            "should_be_say",
            Regex::new(&format!(
                r"(?i)\bshould\s+(?:be|say)\s*[:,]?\s*(?:{}|([^.!?\n]+))",
                QUOTED
            ))
            .unwrap(),
        ),
    ]
});

/// Run the cascade over `feedback` given the learner's `original` utterance
pub fn extract_fragment(feedback: &str, original: &str) -> Option<Extraction> {
    CASCADE.iter().find_map(|(name, re)| {
        run_pattern(re, feedback, original).map(|fragment| Extraction {
            pattern: name,
            fragment,
        })
    })
}

/// Run a single named pattern
pub fn extract_with(pattern: &str, feedback: &str, original: &str) -> Option<String> {
    CASCADE
        .iter()
        .find(|(name, _)| *name == pattern)
        .and_then(|(_, re)| run_pattern(re, feedback, original))
}

/// Pattern names in evaluation order
pub fn pattern_names() -> impl Iterator<Item = &'static str> {
    CASCADE.iter().map(|(name, _)| *name)
}

fn run_pattern(re: &Regex, feedback: &str, original: &str) -> Option<String> {
    let original = normalize(original);
    re.captures_iter(feedback).find_map(|caps| {
        let start = caps.get(0).map_or(0, |m| m.start());
        if QUOTING_LEARNER.is_match(&feedback[..start]) {
            return None;
        }
        let fragment = clean_fragment(first_group(&caps)?);
        if fragment.is_empty() || (!original.is_empty() && normalize(&fragment) == original) {
            return None;
        }
        Some(fragment)
    })
}

/// Patterns use alternation, so only one of their groups participates
fn first_group<'t>(caps: &Captures<'t>) -> Option<&'t str> {
    caps.iter().skip(1).flatten().map(|m| m.as_str()).next()
}

fn normalize(text: &str) -> String {
    text.trim()
        .trim_end_matches(|c: char| matches!(c, '.' | '!' | '?'))
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn clean_fragment(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '"' | '\'' | '“' | '”'))
        .trim_end_matches(|c: char| matches!(c, ',' | ';' | ':'))
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_more_common_to_say_wins_over_later_patterns() {
        let text = "Good effort! It's more common to say \"I did my homework\". \
                    You could say **did** here.";
        let extraction = extract_fragment(text, "").unwrap();
        assert_eq!(extraction.pattern, "more_common_to_say");
        assert_eq!(extraction.fragment, "I did my homework");
    }

    #[test]
    fn test_it_would_be() {
        assert_eq!(
            extract_with("it_would_be", "Close! It would be: 'I have been waiting'.", ""),
            Some("I have been waiting".into())
        );
    }

    #[test]
    fn test_bold_span_keeps_apostrophe() {
        let text = "Almost! It should be **o'clock** with an apostrophe.";
        let extraction = extract_fragment(text, "").unwrap();
        assert_eq!(extraction.pattern, "bold_span");
        assert_eq!(extraction.fragment, "o'clock");
    }

    #[test]
    fn test_single_quotes_allow_inner_apostrophes() {
        assert_eq!(
            extract_with("should_be_say", "It should be 'seven o'clock'.", ""),
            Some("seven o'clock".into())
        );
    }

    #[test]
    fn test_quoted_first_person() {
        assert_eq!(
            extract_with("quoted_first_person", "Try this: “I went to the beach yesterday.”", ""),
            Some("I went to the beach yesterday.".into())
        );
        assert_eq!(extract_with("quoted_first_person", "\"Indeed\" is formal.", ""), None);
    }

    #[test]
    fn test_you_could_say_quoted_and_unquoted() {
        assert_eq!(
            extract_with("you_could_say", "You could say 'see you later'.", ""),
            Some("see you later".into())
        );
        assert_eq!(
            extract_with("you_could_say", "You can also say: see you soon. Bye!", ""),
            Some("see you soon".into())
        );
    }

    #[test]
    fn test_quoted_with_verb() {
        assert_eq!(
            extract_with("quoted_with_verb", "The phrase \"she goes there\" works.", ""),
            Some("she goes there".into())
        );
        assert_eq!(extract_with("quoted_with_verb", "The word \"breakfast\" works.", ""), None);
    }

    #[test]
    fn test_it_was_is() {
        assert_eq!(
            extract_with("it_was_is", "Not quite. It was a great movie, right?", ""),
            Some("It was a great movie, right".into())
        );
    }

    #[test]
    fn test_bulleted_quoted() {
        let text = "Some options:\n- 'I'd like a coffee'\n- 'Could I have a coffee'";
        assert_eq!(extract_with("bulleted_quoted", text, ""), Some("I'd like a coffee".into()));
    }

    #[test]
    fn test_should_be_unquoted_stops_at_sentence_end() {
        assert_eq!(
            extract_with("should_be_say", "The verb should be went. Keep going!", ""),
            Some("went".into())
        );
    }

    #[test]
    fn test_span_after_instead_of_is_skipped() {
        let text = "Instead of \"I goed to school\", you should say \"I went to school\".";
        let extraction = extract_fragment(text, "I goed to school").unwrap();
        assert_eq!(extraction.pattern, "quoted_first_person");
        assert_eq!(extraction.fragment, "I went to school");

        // skipped even when the learner's wording is not known
        assert_eq!(
            extract_with("quoted_first_person", text, ""),
            Some("I went to school".into())
        );
    }

    #[test]
    fn test_repeated_utterance_is_skipped() {
        let text = "You said \"I goed home.\" It would be: \"I went home\".";
        let extraction = extract_fragment(text, "i goed home").unwrap();
        assert_eq!(extraction.fragment, "I went home");

        assert_eq!(
            extract_with("quoted_first_person", "\"I goed home\" is close.", "I goed home"),
            None
        );
    }

    #[test]
    fn test_no_fragment() {
        assert_eq!(extract_fragment("Not quite, think about the tense again.", ""), None);
    }

    #[test]
    fn test_cascade_order() {
        let names: Vec<_> = pattern_names().collect();
        assert_eq!(
            names,
            vec![
                "more_common_to_say",
                "it_would_be",
                "bold_span",
                "quoted_first_person",
                "you_could_say",
                "quoted_with_verb",
                "it_was_is",
                "bulleted_quoted",
                "should_be_say",
            ]
        );
    }
}
