//! Practice session state
//!
//! A session moves `Idle -> Active -> Ended` and never back. Turns are
//! append-only while active; ending snapshots the score, caches the report and
//! drops the turn history.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use lingo_core::{LanguagePair, ResolvedTopic, TopicInfo, Turn};
use serde::{Deserialize, Serialize};

use crate::report::SessionReport;
use crate::score::{ScoreState, ScoreTracker};

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Idle,
    Active,
    Ended,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Active => "active",
            SessionPhase::Ended => "ended",
        }
    }
}

/// One user's practice conversation
#[derive(Debug)]
pub struct PracticeSession {
    id: String,
    user_id: String,
    topic: TopicInfo,
    languages: LanguagePair,
    phase: SessionPhase,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    turns: Vec<Turn>,
    score: ScoreTracker,
    report: Option<SessionReport>,
    last_activity: Instant,
}

impl PracticeSession {
    pub fn new(id: impl Into<String>, user_id: impl Into<String>, resolved: ResolvedTopic) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            topic: resolved.topic,
            languages: resolved.languages,
            phase: SessionPhase::Idle,
            started_at: Utc::now(),
            ended_at: None,
            turns: Vec::new(),
            score: ScoreTracker::new(),
            report: None,
            last_activity: Instant::now(),
        }
    }

    /// Move from `Idle` to `Active`; returns false from any other phase
    pub fn activate(&mut self) -> bool {
        if self.phase != SessionPhase::Idle {
            return false;
        }
        self.phase = SessionPhase::Active;
        self.started_at = Utc::now();
        self.score.reset();
        self.touch();
        true
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn topic(&self) -> &TopicInfo {
        &self.topic
    }

    pub fn languages(&self) -> LanguagePair {
        self.languages
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Sequence number for the next turn (1-based)
    pub fn next_sequence(&self) -> u32 {
        self.score.state().total_turns + 1
    }

    pub fn score(&self) -> &ScoreTracker {
        &self.score
    }

    pub fn score_state(&self) -> ScoreState {
        self.score.state()
    }

    pub fn report(&self) -> Option<&SessionReport> {
        self.report.as_ref()
    }

    /// Append a classified turn and update the counters
    ///
    /// Ignored unless the session is active.
    pub fn push_turn(&mut self, turn: Turn) -> bool {
        if !self.is_active() {
            return false;
        }
        self.score.record_outcome(turn.counts_against_score());
        self.turns.push(turn);
        self.touch();
        true
    }

    /// End the session, caching its report
    ///
    /// Clears the turn history. Returns false if the session was not active.
    pub fn finish(&mut self, report: SessionReport) -> bool {
        if !self.is_active() {
            return false;
        }
        self.phase = SessionPhase::Ended;
        self.ended_at = Some(report.ended_at.max(self.started_at));
        self.report = Some(report);
        self.turns.clear();
        self.touch();
        true
    }

    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_activity.elapsed()
    }

    /// Seconds between start and `until`, never negative
    pub fn duration_seconds(&self, until: DateTime<Utc>) -> u64 {
        (until - self.started_at).num_seconds().max(0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingo_core::{AiFeedback, Mistake, MistakeCategory, TurnVerdict};

    fn session() -> PracticeSession {
        let resolved = ResolvedTopic {
            topic: TopicInfo::new("daily_routine", "Daily Routine"),
            languages: LanguagePair::default(),
        };
        PracticeSession::new("s1", "u1", resolved)
    }

    fn turn(seq: u32, verdict: TurnVerdict) -> Turn {
        Turn::new(seq, "I wake up at 7 oclock", &AiFeedback::default(), verdict)
    }

    #[test]
    fn test_phases() {
        let mut s = session();
        assert_eq!(s.phase(), SessionPhase::Idle);
        assert!(!s.push_turn(turn(1, TurnVerdict::correct())));

        assert!(s.activate());
        assert!(!s.activate());
        assert!(s.is_active());
    }

    #[test]
    fn test_turns_update_score() {
        let mut s = session();
        s.activate();
        assert_eq!(s.next_sequence(), 1);

        let error = TurnVerdict::with_errors(vec![Mistake::new(
            MistakeCategory::SentenceStructure,
            "I wake up at 7 oclock",
            "o'clock",
        )]);
        assert!(s.push_turn(turn(1, error)));
        assert!(s.push_turn(turn(2, TurnVerdict::correct())));

        assert_eq!(s.next_sequence(), 3);
        assert_eq!(s.turns().len(), 2);
        assert_eq!(s.score_state().incorrect_turns, 1);
        assert_eq!(s.score().current_score(), 50);
    }
}
