//! Grammar feedback types
//!
//! The closed mistake taxonomy, per-turn verdicts and the raw shape of what the
//! AI collaborator returns. The classifier (text_processing crate) and the
//! report generator (agent crate) both consume [`MistakeCategory`]; its display
//! names and default feedback strings are defined here and nowhere else.

use serde::{Deserialize, Serialize};

/// Feedback shown when a turn has no detectable mistakes
pub const PERFECT_FEEDBACK: &str = "Perfect! No grammar mistakes detected.";

/// Feedback shown when the AI collaborator could not be reached
pub const FALLBACK_FEEDBACK: &str =
    "Feedback is unavailable for this message right now. Keep the conversation going!";

/// Corrected-text placeholder used when a correction was detected but no
/// fragment could be extracted from the AI's prose
pub const EXTRACTION_PLACEHOLDER: &str = "See the tutor's feedback above for the suggested correction.";

/// Mistake taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MistakeCategory {
    /// Wrong tense or verb form
    TenseVerb,
    /// Word order, missing words, incomplete sentences
    SentenceStructure,
    /// Wrong word for the meaning (vocabulary, not grammar)
    WordChoice,
    /// a / an / the / some
    ArticleDeterminer,
    /// in / on / at / to ...
    Preposition,
    /// Grammatical but unnatural phrasing
    FluencyNaturalness,
}

/// Which score bucket a category belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MistakeKind {
    Grammar,
    Vocabulary,
    Fluency,
}

impl MistakeCategory {
    pub const ALL: [MistakeCategory; 6] = [
        MistakeCategory::TenseVerb,
        MistakeCategory::SentenceStructure,
        MistakeCategory::WordChoice,
        MistakeCategory::ArticleDeterminer,
        MistakeCategory::Preposition,
        MistakeCategory::FluencyNaturalness,
    ];

    /// Stable identifier (matches the serde representation)
    pub fn as_str(&self) -> &'static str {
        match self {
            MistakeCategory::TenseVerb => "tense_verb",
            MistakeCategory::SentenceStructure => "sentence_structure",
            MistakeCategory::WordChoice => "word_choice",
            MistakeCategory::ArticleDeterminer => "article_determiner",
            MistakeCategory::Preposition => "preposition",
            MistakeCategory::FluencyNaturalness => "fluency_naturalness",
        }
    }

    /// Name shown to learners
    pub fn display_name(&self) -> &'static str {
        match self {
            MistakeCategory::TenseVerb => "Tense & Verb Forms",
            MistakeCategory::SentenceStructure => "Sentence Structure",
            MistakeCategory::WordChoice => "Word Choice",
            MistakeCategory::ArticleDeterminer => "Articles & Determiners",
            MistakeCategory::Preposition => "Prepositions",
            MistakeCategory::FluencyNaturalness => "Fluency & Naturalness",
        }
    }

    /// Short feedback line for a turn dominated by this category
    pub fn default_feedback(&self) -> &'static str {
        match self {
            MistakeCategory::TenseVerb => "Watch your verb tense.",
            MistakeCategory::SentenceStructure => "Check the structure of your sentence.",
            MistakeCategory::WordChoice => "Good try! A different word fits better here.",
            MistakeCategory::ArticleDeterminer => "Check your articles (a, an, the).",
            MistakeCategory::Preposition => "Check your preposition.",
            MistakeCategory::FluencyNaturalness => {
                "Good! Here is a more natural way to say it."
            }
        }
    }

    /// Improvement tip used in session reports
    pub fn improvement_tip(&self) -> &'static str {
        match self {
            MistakeCategory::TenseVerb => {
                "Review past-tense forms, especially irregular verbs like go/went and eat/ate."
            }
            MistakeCategory::SentenceStructure => {
                "Make sure every sentence has a subject and a verb, in the usual word order."
            }
            MistakeCategory::WordChoice => {
                "Learn common word pairs that are easy to mix up, like make/do and say/tell."
            }
            MistakeCategory::ArticleDeterminer => {
                "Practice when to use a, an and the before nouns."
            }
            MistakeCategory::Preposition => {
                "Note the prepositions that go with times and places (at 7, on Monday, in May)."
            }
            MistakeCategory::FluencyNaturalness => {
                "Listen to how native speakers phrase everyday ideas and reuse those expressions."
            }
        }
    }

    /// Severity assumed when the AI supplies none
    pub fn default_severity(&self) -> Severity {
        match self {
            MistakeCategory::SentenceStructure => Severity::Major,
            MistakeCategory::TenseVerb | MistakeCategory::WordChoice => Severity::Medium,
            MistakeCategory::ArticleDeterminer
            | MistakeCategory::Preposition
            | MistakeCategory::FluencyNaturalness => Severity::Minor,
        }
    }

    pub fn kind(&self) -> MistakeKind {
        match self {
            MistakeCategory::WordChoice => MistakeKind::Vocabulary,
            MistakeCategory::FluencyNaturalness => MistakeKind::Fluency,
            _ => MistakeKind::Grammar,
        }
    }

    /// Fluency suggestions are stylistic and never count against accuracy
    pub fn counts_against_score(&self) -> bool {
        !matches!(self, MistakeCategory::FluencyNaturalness)
    }

    /// Parse an AI-chosen category label
    ///
    /// Models rarely use our exact identifiers, so common synonyms are
    /// accepted. Returns `None` for labels that carry no usable signal.
    pub fn parse_lenient(label: &str) -> Option<Self> {
        let normalized: String = label
            .trim()
            .to_ascii_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
            .collect();
        let words: Vec<&str> = normalized.split_whitespace().collect();
        let has = |w: &str| words.iter().any(|x| x.starts_with(w));

        if words.is_empty() {
            return None;
        }
        if has("tense") || has("verb") || has("conjugat") {
            Some(MistakeCategory::TenseVerb)
        } else if has("article") || has("determiner") {
            Some(MistakeCategory::ArticleDeterminer)
        } else if has("preposition") {
            Some(MistakeCategory::Preposition)
        } else if has("vocab") || has("lexical") || (has("word") && (has("choice") || has("usage")))
        {
            Some(MistakeCategory::WordChoice)
        } else if has("fluen") || has("natural") || has("style") || has("idiom") {
            Some(MistakeCategory::FluencyNaturalness)
        } else if has("structure") || has("syntax") || has("order") || has("sentence") {
            Some(MistakeCategory::SentenceStructure)
        } else {
            None
        }
    }
}

impl std::fmt::Display for MistakeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Mistake severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Minor,
    Medium,
    Major,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Minor => "minor",
            Severity::Medium => "medium",
            Severity::Major => "major",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "minor" | "low" => Some(Severity::Minor),
            "medium" | "moderate" => Some(Severity::Medium),
            "major" | "high" | "severe" => Some(Severity::Major),
            _ => None,
        }
    }
}

/// Binary turn classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Correct,
    HasErrors,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Correct => "correct",
            Verdict::HasErrors => "has_errors",
        }
    }
}

/// Display tone for the turn feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackTone {
    Success,
    Warning,
    Info,
}

impl FeedbackTone {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackTone::Success => "success",
            FeedbackTone::Warning => "warning",
            FeedbackTone::Info => "info",
        }
    }
}

/// Why a turn's record is degraded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    /// Correction detected but no fragment could be extracted
    FragmentUnrecoverable,
    /// The AI collaborator failed or timed out
    AiUnavailable,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::FragmentUnrecoverable => "fragment_unrecoverable",
            ReasonCode::AiUnavailable => "ai_unavailable",
        }
    }
}

/// A normalized mistake
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mistake {
    pub category: MistakeCategory,
    pub original: String,
    pub corrected: String,
    pub explanation: String,
    pub severity: Severity,
}

impl Mistake {
    /// Create a mistake with the category's default severity and feedback as explanation
    pub fn new(
        category: MistakeCategory,
        original: impl Into<String>,
        corrected: impl Into<String>,
    ) -> Self {
        Self {
            category,
            original: original.into(),
            corrected: corrected.into(),
            explanation: category.default_feedback().to_string(),
            severity: category.default_severity(),
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

/// A mistake as the AI collaborator reported it, before normalization
///
/// Field aliases cover the names models tend to invent for the same data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredMistake {
    #[serde(default, alias = "incorrect", alias = "wrong", alias = "error", alias = "mistake")]
    pub original: Option<String>,
    #[serde(default, alias = "correction", alias = "correct", alias = "fixed", alias = "suggestion")]
    pub corrected: Option<String>,
    #[serde(default, alias = "type", alias = "error_type", alias = "kind")]
    pub category: Option<String>,
    #[serde(default, alias = "reason", alias = "note")]
    pub explanation: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
}

impl StructuredMistake {
    pub fn new(original: impl Into<String>, corrected: impl Into<String>) -> Self {
        Self {
            original: Some(original.into()),
            corrected: Some(corrected.into()),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// Both fragments, trimmed, when both are present and non-empty
    pub fn fragments(&self) -> Option<(&str, &str)> {
        let original = self.original.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let corrected = self.corrected.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some((original, corrected))
    }
}

/// What the AI collaborator returned for one utterance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiFeedback {
    /// Conversational reply that keeps the practice going
    #[serde(default)]
    pub reply: String,
    /// Free-text critique; scanned for implicit corrections
    #[serde(default)]
    pub feedback_text: String,
    /// Machine-readable mistakes, when the model filled them in
    #[serde(default)]
    pub structured_mistakes: Option<Vec<StructuredMistake>>,
    /// The model's own correct/incorrect flag
    #[serde(default)]
    pub structured_verdict: Option<bool>,
}

impl AiFeedback {
    pub fn text(feedback_text: impl Into<String>) -> Self {
        Self {
            feedback_text: feedback_text.into(),
            ..Default::default()
        }
    }

    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = reply.into();
        self
    }

    pub fn with_mistakes(mut self, mistakes: Vec<StructuredMistake>) -> Self {
        self.structured_mistakes = Some(mistakes);
        self
    }

    pub fn with_verdict(mut self, is_correct: bool) -> Self {
        self.structured_verdict = Some(is_correct);
        self
    }
}

/// Classifier output for one turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnVerdict {
    pub verdict: Verdict,
    pub mistakes: Vec<Mistake>,
    /// Short display feedback
    pub feedback: String,
    pub tone: FeedbackTone,
    /// Dominant category, `None` for correct turns
    pub category: Option<MistakeCategory>,
    /// Name of the correction indicator that fired, if any
    pub matched_pattern: Option<String>,
    pub reason: Option<ReasonCode>,
}

impl TurnVerdict {
    /// A clean turn
    pub fn correct() -> Self {
        Self {
            verdict: Verdict::Correct,
            mistakes: Vec::new(),
            feedback: PERFECT_FEEDBACK.to_string(),
            tone: FeedbackTone::Success,
            category: None,
            matched_pattern: None,
            reason: None,
        }
    }

    /// Neutral verdict used when the AI collaborator failed
    pub fn fallback() -> Self {
        Self {
            verdict: Verdict::Correct,
            mistakes: Vec::new(),
            feedback: FALLBACK_FEEDBACK.to_string(),
            tone: FeedbackTone::Info,
            category: None,
            matched_pattern: None,
            reason: Some(ReasonCode::AiUnavailable),
        }
    }

    /// A turn with at least one mistake
    ///
    /// Returns a correct verdict if `mistakes` is empty.
    pub fn with_errors(mistakes: Vec<Mistake>) -> Self {
        let Some(category) = dominant_category(&mistakes) else {
            return Self::correct();
        };
        let tone = if category.counts_against_score() {
            FeedbackTone::Warning
        } else {
            FeedbackTone::Info
        };
        Self {
            verdict: Verdict::HasErrors,
            mistakes,
            feedback: category.default_feedback().to_string(),
            tone,
            category: Some(category),
            matched_pattern: None,
            reason: None,
        }
    }

    pub fn with_matched_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.matched_pattern = Some(pattern.into());
        self
    }

    pub fn with_reason(mut self, reason: ReasonCode) -> Self {
        self.reason = Some(reason);
        self
    }

    pub fn is_correct(&self) -> bool {
        self.verdict == Verdict::Correct
    }

    /// Whether this turn should increment the incorrect counter
    pub fn counts_against_score(&self) -> bool {
        match (self.verdict, self.category) {
            (Verdict::Correct, _) => false,
            (Verdict::HasErrors, Some(category)) => category.counts_against_score(),
            (Verdict::HasErrors, None) => true,
        }
    }
}

/// Dominant category of a mistake list
///
/// Fluency is dominant only when every mistake is a fluency suggestion;
/// otherwise the most frequent non-fluency category wins, ties going to the
/// one seen first.
pub fn dominant_category(mistakes: &[Mistake]) -> Option<MistakeCategory> {
    if mistakes.is_empty() {
        return None;
    }

    let mut counts: Vec<(MistakeCategory, usize)> = Vec::new();
    for mistake in mistakes.iter().filter(|m| m.category.counts_against_score()) {
        match counts.iter_mut().find(|(c, _)| *c == mistake.category) {
            Some((_, n)) => *n += 1,
            None => counts.push((mistake.category, 1)),
        }
    }

    // max_by_key keeps the last maximum, so walk in reverse to prefer the first seen
    counts
        .into_iter()
        .rev()
        .max_by_key(|(_, n)| *n)
        .map(|(c, _)| c)
        .or(Some(MistakeCategory::FluencyNaturalness))
}

/// Final session scores handed to persistence and reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalScores {
    pub overall: u8,
    pub grammar: u8,
    pub fluency: u8,
    pub total_turns: u32,
    pub incorrect_turns: u32,
}
