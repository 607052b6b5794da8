//! Rule-based mistake categorization
//!
//! Rules run in a fixed order and the first that applies decides:
//! 1. sentence-structure language (missing verb, word order, ...)
//! 2. tense language, or a base verb in the original whose past form appears
//!    in the correction
//! 3. a known word-substitution pair between original and correction
//! 4. "article"
//! 5. "preposition"
//! 6. naturalness language with no grammar signal
//! 7. sentence structure as the fallback

use std::collections::HashSet;

use lingo_core::MistakeCategory;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

static STRUCTURE_LANGUAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:missing\s+(?:an?\s+|the\s+)?(?:main\s+)?(?:verb|subject|word)|sentence\s+structure|word\s+order|incomplete\s+sentence|run-on)",
    )
    .unwrap()
});

static TENSE_LANGUAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:tenses?|past\s+simple|simple\s+past|present\s+perfect|past\s+participle|verb\s+forms?|conjugat\w*|third[-\s]person|irregular\s+verbs?|subject[-\s]verb\s+agreement)\b",
    )
    .unwrap()
});

static VOCABULARY_LANGUAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:word\s+choice|vocabulary)\b").unwrap());

static ARTICLE_LANGUAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\barticles?\b").unwrap());

static PREPOSITION_LANGUAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bprepositions?\b").unwrap());

static NATURALNESS_LANGUAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:more\s+natural|sounds?\s+(?:more\s+)?natural|naturally|more\s+common|native\s+speakers?|idiomatic|fluent|fluency|casual|conversational)\b",
    )
    .unwrap()
});

static GRAMMAR_SIGNAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:grammar|grammatical(?:ly)?|incorrect|wrong|mistakes?|errors?)\b").unwrap()
});

/// Base form → simple past
const VERB_PAIRS: &[(&str, &str)] = &[
    ("go", "went"),
    ("eat", "ate"),
    ("see", "saw"),
    ("come", "came"),
    ("do", "did"),
    ("have", "had"),
    ("make", "made"),
    ("take", "took"),
    ("get", "got"),
    ("give", "gave"),
    ("buy", "bought"),
    ("bring", "brought"),
    ("think", "thought"),
    ("teach", "taught"),
    ("catch", "caught"),
    ("find", "found"),
    ("feel", "felt"),
    ("leave", "left"),
    ("meet", "met"),
    ("sleep", "slept"),
    ("keep", "kept"),
    ("sit", "sat"),
    ("stand", "stood"),
    ("understand", "understood"),
    ("write", "wrote"),
    ("drive", "drove"),
    ("ride", "rode"),
    ("speak", "spoke"),
    ("break", "broke"),
    ("wake", "woke"),
    ("drink", "drank"),
    ("swim", "swam"),
    ("sing", "sang"),
    ("begin", "began"),
    ("run", "ran"),
    ("know", "knew"),
    ("grow", "grew"),
    ("fly", "flew"),
    ("wear", "wore"),
    ("tell", "told"),
    ("sell", "sold"),
    ("say", "said"),
    ("pay", "paid"),
    ("hear", "heard"),
    ("lose", "lost"),
    ("send", "sent"),
    ("spend", "spent"),
    ("build", "built"),
    ("win", "won"),
    ("forget", "forgot"),
    ("choose", "chose"),
    ("fall", "fell"),
    ("become", "became"),
    ("walk", "walked"),
    ("play", "played"),
    ("watch", "watched"),
    ("visit", "visited"),
    ("study", "studied"),
    ("work", "worked"),
    ("live", "lived"),
    ("like", "liked"),
    ("want", "wanted"),
    ("talk", "talked"),
    ("cook", "cooked"),
    ("stay", "stayed"),
    ("travel", "traveled"),
    ("arrive", "arrived"),
    ("start", "started"),
    ("finish", "finished"),
    ("try", "tried"),
    ("listen", "listened"),
    ("call", "called"),
];

/// Commonly confused words: (used by the learner, suggested instead)
const WORD_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("did", "made"),
    ("do", "make"),
    ("make", "do"),
    ("made", "did"),
    ("say", "tell"),
    ("tell", "say"),
    ("said", "told"),
    ("told", "said"),
    ("borrow", "lend"),
    ("lend", "borrow"),
    ("bring", "take"),
    ("take", "bring"),
    ("fun", "funny"),
    ("funny", "fun"),
    ("look", "watch"),
    ("look", "see"),
    ("see", "watch"),
    ("watch", "see"),
    ("hear", "listen"),
    ("listen", "hear"),
    ("learn", "teach"),
    ("teach", "learn"),
    ("remember", "remind"),
    ("remind", "remember"),
    ("lose", "miss"),
    ("miss", "lose"),
    ("rob", "steal"),
    ("job", "work"),
    ("work", "job"),
    ("travel", "trip"),
    ("trip", "travel"),
    ("sensible", "sensitive"),
    ("actually", "currently"),
    ("assist", "attend"),
];

/// Assign a taxonomy category
///
/// `language` is the tutor's explanation text; `original` and `corrected` are
/// the fragments (pass an empty `corrected` when none was extracted).
pub fn assign_category(original: &str, corrected: &str, language: &str) -> MistakeCategory {
    if STRUCTURE_LANGUAGE.is_match(language) {
        return MistakeCategory::SentenceStructure;
    }

    let original_words = words(original);
    let corrected_words = words(corrected);

    if TENSE_LANGUAGE.is_match(language) || has_verb_pair(&original_words, &corrected_words) {
        return MistakeCategory::TenseVerb;
    }
    if has_substitution(&original_words, &corrected_words) || VOCABULARY_LANGUAGE.is_match(language)
    {
        return MistakeCategory::WordChoice;
    }
    if ARTICLE_LANGUAGE.is_match(language) {
        return MistakeCategory::ArticleDeterminer;
    }
    if PREPOSITION_LANGUAGE.is_match(language) {
        return MistakeCategory::Preposition;
    }
    if NATURALNESS_LANGUAGE.is_match(language) && !GRAMMAR_SIGNAL.is_match(language) {
        return MistakeCategory::FluencyNaturalness;
    }

    MistakeCategory::SentenceStructure
}

fn words(text: &str) -> HashSet<String> {
    text.unicode_words().map(|w| w.to_lowercase()).collect()
}

fn has_verb_pair(original: &HashSet<String>, corrected: &HashSet<String>) -> bool {
    VERB_PAIRS.iter().any(|(base, past)| {
        original.contains(*base) && corrected.contains(*past) && !original.contains(*past)
    })
}

fn has_substitution(original: &HashSet<String>, corrected: &HashSet<String>) -> bool {
    WORD_SUBSTITUTIONS.iter().any(|(used, suggested)| {
        original.contains(*used) && corrected.contains(*suggested) && !original.contains(*suggested)
    })
}
