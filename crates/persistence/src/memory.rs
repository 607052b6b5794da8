//! Process-local recorder, used when ScyllaDB persistence is disabled

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use lingo_core::{FinalScores, Mistake, Result, SessionRecorder, Turn};
use parking_lot::RwLock;

/// Completed sessions kept by [`InMemoryRecorder::new`]
pub const DEFAULT_RETAINED_SESSIONS: usize = 256;

/// A completed session as recorded
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedSession {
    pub scores: FinalScores,
    pub duration_seconds: u64,
}

#[derive(Default)]
struct SessionRecords {
    turns: Vec<Turn>,
    mistakes: Vec<(u32, Mistake)>,
    completion: Option<CompletedSession>,
}

#[derive(Default)]
struct Store {
    sessions: HashMap<String, SessionRecords>,
    /// Completed session ids, oldest first
    completed: VecDeque<String>,
}

/// In-memory [`SessionRecorder`]
///
/// Records are lost on restart. Only the most recent completed sessions are
/// retained; once more than `max_completed` have completed, the oldest one
/// is dropped with all its turns and mistakes.
pub struct InMemoryRecorder {
    store: RwLock<Store>,
    max_completed: usize,
}

impl Default for InMemoryRecorder {
    fn default() -> Self {
        Self::with_retention(DEFAULT_RETAINED_SESSIONS)
    }
}

impl InMemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retention(max_completed: usize) -> Self {
        Self {
            store: RwLock::new(Store::default()),
            max_completed,
        }
    }

    pub fn turns(&self, session_id: &str) -> Vec<Turn> {
        self.store
            .read()
            .sessions
            .get(session_id)
            .map(|r| r.turns.clone())
            .unwrap_or_default()
    }

    /// Mistakes with the sequence of the turn they belong to
    pub fn mistakes(&self, session_id: &str) -> Vec<(u32, Mistake)> {
        self.store
            .read()
            .sessions
            .get(session_id)
            .map(|r| r.mistakes.clone())
            .unwrap_or_default()
    }

    pub fn completion(&self, session_id: &str) -> Option<CompletedSession> {
        self.store
            .read()
            .sessions
            .get(session_id)
            .and_then(|r| r.completion.clone())
    }

    /// Sessions with any records held
    pub fn session_count(&self) -> usize {
        self.store.read().sessions.len()
    }

    /// Turns and mistakes held across all sessions
    pub fn record_count(&self) -> usize {
        self.store
            .read()
            .sessions
            .values()
            .map(|r| r.turns.len() + r.mistakes.len())
            .sum()
    }

    /// Drop everything recorded for a session
    pub fn forget(&self, session_id: &str) {
        let mut store = self.store.write();
        store.sessions.remove(session_id);
        store.completed.retain(|id| id != session_id);
    }
}

#[async_trait]
impl SessionRecorder for InMemoryRecorder {
    async fn save_turn(&self, session_id: &str, turn: &Turn) -> Result<()> {
        self.store
            .write()
            .sessions
            .entry(session_id.to_string())
            .or_default()
            .turns
            .push(turn.clone());
        Ok(())
    }

    async fn save_mistake(
        &self,
        session_id: &str,
        turn_sequence: u32,
        mistake: &Mistake,
    ) -> Result<()> {
        self.store
            .write()
            .sessions
            .entry(session_id.to_string())
            .or_default()
            .mistakes
            .push((turn_sequence, mistake.clone()));
        Ok(())
    }

    async fn complete_session(
        &self,
        session_id: &str,
        scores: &FinalScores,
        duration_seconds: u64,
    ) -> Result<()> {
        let mut store = self.store.write();
        let records = store.sessions.entry(session_id.to_string()).or_default();
        let first_completion = records.completion.is_none();
        records.completion = Some(CompletedSession {
            scores: *scores,
            duration_seconds,
        });
        if first_completion {
            store.completed.push_back(session_id.to_string());
        }

        let mut evicted = 0usize;
        while store.completed.len() > self.max_completed {
            if let Some(oldest) = store.completed.pop_front() {
                store.sessions.remove(&oldest);
                evicted += 1;
            }
        }

        tracing::debug!(
            session_id = %session_id,
            evicted,
            retained = store.completed.len(),
            "Session completion recorded in memory"
        );
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingo_core::{AiFeedback, MistakeCategory, TurnVerdict};

    fn scores(turns: u32) -> FinalScores {
        FinalScores {
            overall: 50,
            grammar: 0,
            fluency: 100,
            total_turns: turns,
            incorrect_turns: turns,
        }
    }

    fn error_turn(sequence: u32, mistake: &Mistake) -> Turn {
        Turn::new(
            sequence,
            "I goed home",
            &AiFeedback::text("Instead of \"goed\", say \"went\"."),
            TurnVerdict::with_errors(vec![mistake.clone()]),
        )
    }

    #[tokio::test]
    async fn test_records_turns_mistakes_and_completion() {
        let recorder = InMemoryRecorder::new();
        let mistake = Mistake::new(MistakeCategory::TenseVerb, "goed", "went");
        let turn = error_turn(1, &mistake);

        recorder.save_turn("s1", &turn).await.unwrap();
        recorder.save_mistake("s1", 1, &mistake).await.unwrap();
        recorder.complete_session("s1", &scores(1), 42).await.unwrap();

        assert_eq!(recorder.turns("s1"), vec![turn]);
        assert_eq!(recorder.mistakes("s1"), vec![(1, mistake)]);
        assert_eq!(recorder.completion("s1").unwrap().duration_seconds, 42);
        assert!(!recorder.is_durable());

        recorder.forget("s1");
        assert!(recorder.turns("s1").is_empty());
        assert!(recorder.completion("s1").is_none());
        assert_eq!(recorder.session_count(), 0);
    }

    #[tokio::test]
    async fn test_completed_sessions_are_bounded() {
        let recorder = InMemoryRecorder::with_retention(3);
        let mistake = Mistake::new(MistakeCategory::TenseVerb, "goed", "went");

        for s in 0..200 {
            let id = format!("s{}", s);
            for seq in 1..=5 {
                recorder.save_turn(&id, &error_turn(seq, &mistake)).await.unwrap();
                recorder.save_mistake(&id, seq, &mistake).await.unwrap();
            }
            recorder.complete_session(&id, &scores(5), 60).await.unwrap();
        }

        assert_eq!(recorder.session_count(), 3);
        assert_eq!(recorder.record_count(), 3 * 10);
        assert!(recorder.completion("s0").is_none());
        assert!(recorder.turns("s196").is_empty());
        assert_eq!(recorder.turns("s199").len(), 5);
        assert!(recorder.completion("s197").is_some());
    }

    #[tokio::test]
    async fn test_active_sessions_are_not_evicted() {
        let recorder = InMemoryRecorder::with_retention(1);
        let mistake = Mistake::new(MistakeCategory::Preposition, "in Monday", "on Monday");

        recorder.save_turn("live", &error_turn(1, &mistake)).await.unwrap();
        for id in ["a", "b", "c"] {
            recorder.complete_session(id, &scores(0), 1).await.unwrap();
        }
        // a repeated completion does not take a second retention slot
        recorder.complete_session("c", &scores(0), 2).await.unwrap();

        assert_eq!(recorder.turns("live").len(), 1);
        assert!(recorder.completion("b").is_none());
        assert_eq!(recorder.completion("c").unwrap().duration_seconds, 2);
        assert_eq!(recorder.session_count(), 2);
    }
}
