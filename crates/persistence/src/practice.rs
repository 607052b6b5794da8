//! Practice session records in ScyllaDB

use async_trait::async_trait;
use chrono::Utc;
use lingo_core::{FinalScores, Mistake, SessionRecorder, Turn};
use uuid::Uuid;

use crate::{PersistenceError, ScyllaClient};

/// ScyllaDB implementation of [`SessionRecorder`]
#[derive(Clone)]
pub struct ScyllaPracticeRecorder {
    client: ScyllaClient,
}

impl ScyllaPracticeRecorder {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }

    async fn insert_turn(&self, session_id: &str, turn: &Turn) -> Result<(), PersistenceError> {
        let query = format!(
            "INSERT INTO {} (
                session_id, sequence, user_text, reply, ai_feedback_text,
                verdict, feedback, tone, category, matched_pattern, reason, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            self.client.table("practice_turns")
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    session_id,
                    turn.sequence as i32,
                    &turn.user_text,
                    &turn.reply,
                    &turn.ai_feedback_text,
                    turn.verdict.as_str(),
                    &turn.feedback,
                    turn.tone.as_str(),
                    turn.category.map(|c| c.as_str()),
                    &turn.matched_pattern,
                    turn.reason.map(|r| r.as_str()),
                    turn.timestamp.timestamp_millis(),
                ),
            )
            .await?;

        tracing::debug!(
            session_id = %session_id,
            sequence = turn.sequence,
            verdict = turn.verdict.as_str(),
            "Turn saved to ScyllaDB"
        );
        Ok(())
    }

    async fn insert_mistake(
        &self,
        session_id: &str,
        turn_sequence: u32,
        mistake: &Mistake,
    ) -> Result<(), PersistenceError> {
        let query = format!(
            "INSERT INTO {} (
                session_id, turn_sequence, mistake_id, category,
                original_text, corrected_text, explanation, severity, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            self.client.table("practice_mistakes")
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    session_id,
                    turn_sequence as i32,
                    Uuid::new_v4(),
                    mistake.category.as_str(),
                    &mistake.original,
                    &mistake.corrected,
                    &mistake.explanation,
                    mistake.severity.as_str(),
                    Utc::now().timestamp_millis(),
                ),
            )
            .await?;

        Ok(())
    }

    async fn insert_completion(
        &self,
        session_id: &str,
        scores: &FinalScores,
        duration_seconds: u64,
    ) -> Result<(), PersistenceError> {
        let duration = i64::try_from(duration_seconds)
            .map_err(|_| PersistenceError::InvalidData(format!("duration {}", duration_seconds)))?;

        let query = format!(
            "INSERT INTO {} (
                session_id, overall_score, grammar_score, fluency_score,
                total_turns, incorrect_turns, duration_seconds, completed_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            self.client.table("practice_sessions")
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    session_id,
                    scores.overall as i32,
                    scores.grammar as i32,
                    scores.fluency as i32,
                    scores.total_turns as i32,
                    scores.incorrect_turns as i32,
                    duration,
                    Utc::now().timestamp_millis(),
                ),
            )
            .await?;

        tracing::info!(
            session_id = %session_id,
            overall = scores.overall,
            total_turns = scores.total_turns,
            "Session completion saved to ScyllaDB"
        );
        Ok(())
    }
}

#[async_trait]
impl SessionRecorder for ScyllaPracticeRecorder {
    async fn save_turn(&self, session_id: &str, turn: &Turn) -> lingo_core::Result<()> {
        Ok(self.insert_turn(session_id, turn).await?)
    }

    async fn save_mistake(
        &self,
        session_id: &str,
        turn_sequence: u32,
        mistake: &Mistake,
    ) -> lingo_core::Result<()> {
        Ok(self.insert_mistake(session_id, turn_sequence, mistake).await?)
    }

    async fn complete_session(
        &self,
        session_id: &str,
        scores: &FinalScores,
        duration_seconds: u64,
    ) -> lingo_core::Result<()> {
        Ok(self
            .insert_completion(session_id, scores, duration_seconds)
            .await?)
    }

    fn is_durable(&self) -> bool {
        true
    }
}
