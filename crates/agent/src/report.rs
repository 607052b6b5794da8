//! End-of-session reports

use std::sync::Arc;

use chrono::{DateTime, Utc};
use lingo_core::{FinalScores, Language, MistakeCategory, MistakeKind, Turn};
use serde::{Deserialize, Serialize};

use crate::fluency::{FluencyEstimator, WordCountFluency};
use crate::score::ScoreState;
use crate::session::PracticeSession;

/// Score at or above which a skill is "excellent"
pub const EXCELLENT_THRESHOLD: u8 = 80;
/// Score at or above which a skill is "developing"
pub const DEVELOPING_THRESHOLD: u8 = 60;

const MAX_CATEGORY_TIPS: usize = 2;

/// Mistakes seen in one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: MistakeCategory,
    pub display_name: String,
    /// Grammar, vocabulary or fluency bucket
    pub kind: MistakeKind,
    pub count: u32,
}

/// Final report for a practice session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub session_id: String,
    pub user_id: String,
    pub topic_id: String,
    pub topic_name: String,
    pub target_language: Language,
    pub scores: FinalScores,
    pub duration_seconds: u64,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// Assessment sentences, grammar first
    pub feedback: Vec<String>,
    pub suggestions: Vec<String>,
    /// Most frequent first
    pub category_breakdown: Vec<CategoryCount>,
}

/// Skill band for a 0..=100 score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    Developing,
    NeedsAttention,
}

impl ScoreBand {
    pub fn from_score(score: u8) -> Self {
        if score >= EXCELLENT_THRESHOLD {
            ScoreBand::Excellent
        } else if score >= DEVELOPING_THRESHOLD {
            ScoreBand::Developing
        } else {
            ScoreBand::NeedsAttention
        }
    }
}

/// Builds [`SessionReport`]s from the session's counters and turn history
#[derive(Clone)]
pub struct ReportGenerator {
    fluency: Arc<dyn FluencyEstimator>,
}

impl ReportGenerator {
    pub fn new(fluency: Arc<dyn FluencyEstimator>) -> Self {
        Self { fluency }
    }

    pub fn generate(
        &self,
        session: &PracticeSession,
        score: ScoreState,
        turns: &[Turn],
        ended_at: DateTime<Utc>,
    ) -> SessionReport {
        let grammar = score.accuracy();
        let fluency = self.fluency.estimate(turns);
        let overall = ((grammar as f64 + fluency as f64) / 2.0).round() as u8;

        let breakdown = category_breakdown(turns);
        let mut suggestions = vec![
            grammar_suggestion(ScoreBand::from_score(grammar)).to_string(),
            fluency_suggestion(ScoreBand::from_score(fluency)).to_string(),
        ];
        suggestions.extend(
            breakdown
                .iter()
                .take(MAX_CATEGORY_TIPS)
                .map(|c| c.category.improvement_tip().to_string()),
        );

        SessionReport {
            session_id: session.id().to_string(),
            user_id: session.user_id().to_string(),
            topic_id: session.topic().id.clone(),
            topic_name: session.topic().name.clone(),
            target_language: session.languages().target,
            scores: FinalScores {
                overall,
                grammar,
                fluency,
                total_turns: score.total_turns,
                incorrect_turns: score.incorrect_turns,
            },
            duration_seconds: session.duration_seconds(ended_at),
            started_at: session.started_at(),
            ended_at,
            feedback: vec![
                grammar_feedback(ScoreBand::from_score(grammar)).to_string(),
                fluency_feedback(ScoreBand::from_score(fluency)).to_string(),
            ],
            suggestions,
            category_breakdown: breakdown,
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new(Arc::new(WordCountFluency::default()))
    }
}

fn category_breakdown(turns: &[Turn]) -> Vec<CategoryCount> {
    let mut counts: Vec<(MistakeCategory, u32)> = Vec::new();
    for mistake in turns.iter().flat_map(|t| t.mistakes.iter()) {
        match counts.iter_mut().find(|(c, _)| *c == mistake.category) {
            Some((_, n)) => *n += 1,
            None => counts.push((mistake.category, 1)),
        }
    }
    // stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category,
            display_name: category.display_name().to_string(),
            kind: category.kind(),
            count,
        })
        .collect()
}

fn grammar_feedback(band: ScoreBand) -> &'static str {
    match band {
        ScoreBand::Excellent => "Excellent grammar! Your sentences were accurate throughout.",
        ScoreBand::Developing => {
            "Your grammar is developing well. A few patterns still need attention."
        }
        ScoreBand::NeedsAttention => {
            "Grammar needs attention. Many sentences had mistakes this session."
        }
    }
}

fn fluency_feedback(band: ScoreBand) -> &'static str {
    match band {
        ScoreBand::Excellent => "Great fluency! You expressed your ideas in full sentences.",
        ScoreBand::Developing => "Your fluency is developing. Try to say a little more each turn.",
        ScoreBand::NeedsAttention => {
            "Fluency needs attention. Your answers were very short."
        }
    }
}

fn grammar_suggestion(band: ScoreBand) -> &'static str {
    match band {
        ScoreBand::Excellent => "Challenge yourself with a harder topic next time.",
        ScoreBand::Developing => "Review the corrections from this session before your next practice.",
        ScoreBand::NeedsAttention => {
            "Slow down and build shorter sentences you are sure about, then extend them."
        }
    }
}

fn fluency_suggestion(band: ScoreBand) -> &'static str {
    match band {
        ScoreBand::Excellent => "Keep adding details and follow-up questions to your answers.",
        ScoreBand::Developing => "Answer with at least two sentences and give a reason or example.",
        ScoreBand::NeedsAttention => {
            "Practice describing your day out loud in complete sentences."
        }
    }
}
