//! Practice session lifecycle
//!
//! Owns every live [`PracticeSession`]. Each turn runs under the session's own
//! async mutex, so one user's turns are strictly serialized while different
//! sessions proceed independently. The index maps are `parking_lot` locks and
//! are never held across an `.await`.
//!
//! Collaborator failures never reach the caller: a failed or slow AI call
//! produces a neutral fallback turn, and persistence errors are logged.
//!
//! Session counters go through the `metrics` facade at the point a session
//! actually starts or leaves the active phase, whatever triggered it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use lingo_core::{
    AiFeedback, FeedbackProvider, LanguagePair, SessionRecorder, TopicInfo, TopicResolver, Turn,
    TurnVerdict, Verdict,
};
use lingo_text_processing::TurnClassifier;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex};

use crate::context::{ContextBuilder, DEFAULT_HISTORY_WINDOW};
use crate::fluency::FluencyEstimator;
use crate::report::{ReportGenerator, SessionReport};
use crate::session::{PracticeSession, SessionPhase};
use crate::LifecycleError;

/// Lifecycle limits and timeouts
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// Sessions held in memory, active or ended
    pub max_sessions: usize,
    /// Idle time after which an active session is ended and an ended one dropped
    pub session_timeout: Duration,
    pub cleanup_interval: Duration,
    /// Upper bound on one AI collaborator call
    pub ai_timeout: Duration,
    pub history_window: usize,
    pub max_utterance_chars: usize,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            max_sessions: 1000,
            session_timeout: Duration::from_secs(3600),
            cleanup_interval: Duration::from_secs(300),
            ai_timeout: Duration::from_secs(20),
            history_window: DEFAULT_HISTORY_WINDOW,
            max_utterance_chars: 2000,
        }
    }
}

/// Returned by [`SessionLifecycle::start_session`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartedSession {
    pub session_id: String,
    pub user_id: String,
    pub topic: TopicInfo,
    pub languages: LanguagePair,
    pub started_at: DateTime<Utc>,
    /// Opening question for the learner, if the topic has one
    pub greeting: Option<String>,
}

/// Returned by [`SessionLifecycle::submit_turn`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnResult {
    pub session_id: String,
    pub turn: Turn,
    /// Accuracy after this turn
    pub score: u8,
    pub total_turns: u32,
    pub incorrect_turns: u32,
    /// Whether the AI collaborator failed and a neutral verdict was used
    pub fallback: bool,
    pub ai_latency_ms: u64,
}

/// Point-in-time view of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session_id: String,
    pub user_id: String,
    pub topic_id: String,
    pub languages: LanguagePair,
    pub phase: SessionPhase,
    pub turn_count: u32,
    pub current_score: u8,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

/// What moved a session out of the active phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndCause {
    /// The learner asked to end it
    Requested,
    /// The learner started another session
    Replaced,
    /// Idle past the session timeout
    Idle,
}

impl EndCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndCause::Requested => "requested",
            EndCause::Replaced => "replaced",
            EndCause::Idle => "idle",
        }
    }
}

type SessionHandle = Arc<Mutex<PracticeSession>>;

/// Session manager for practice conversations
pub struct SessionLifecycle {
    sessions: RwLock<HashMap<String, SessionHandle>>,
    /// user id -> active session id
    active_by_user: RwLock<HashMap<String, String>>,
    topics: Arc<dyn TopicResolver>,
    provider: Arc<dyn FeedbackProvider>,
    recorder: Arc<dyn SessionRecorder>,
    classifier: TurnClassifier,
    context: ContextBuilder,
    reports: ReportGenerator,
    config: LifecycleConfig,
}

impl SessionLifecycle {
    pub fn new(
        config: LifecycleConfig,
        topics: Arc<dyn TopicResolver>,
        provider: Arc<dyn FeedbackProvider>,
        recorder: Arc<dyn SessionRecorder>,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            active_by_user: RwLock::new(HashMap::new()),
            topics,
            provider,
            recorder,
            classifier: TurnClassifier::new(),
            context: ContextBuilder::new(config.history_window),
            reports: ReportGenerator::default(),
            config,
        }
    }

    /// Replace the default word-count fluency heuristic
    pub fn with_fluency_estimator(mut self, estimator: Arc<dyn FluencyEstimator>) -> Self {
        self.reports = ReportGenerator::new(estimator);
        self
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    pub fn topics(&self) -> Vec<TopicInfo> {
        self.topics.topics()
    }

    /// Start a practice session
    ///
    /// A user's previous active session, if any, is ended first.
    pub async fn start_session(
        &self,
        user_id: &str,
        topic_id: &str,
    ) -> Result<StartedSession, LifecycleError> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(LifecycleError::InvalidInput("user_id is empty".to_string()));
        }
        let resolved = self.topics.resolve(topic_id.trim(), user_id)?;

        let id = uuid::Uuid::new_v4().to_string();
        let mut session = PracticeSession::new(&id, user_id, resolved);
        session.activate();

        let started = StartedSession {
            session_id: id.clone(),
            user_id: user_id.to_string(),
            greeting: session.topic().starter.clone(),
            topic: session.topic().clone(),
            languages: session.languages(),
            started_at: session.started_at(),
        };

        {
            let mut sessions = self.sessions.write();
            if sessions.len() >= self.config.max_sessions {
                purge_ended(&mut sessions);
                if sessions.len() >= self.config.max_sessions {
                    return Err(LifecycleError::CapacityReached(self.config.max_sessions));
                }
            }
            sessions.insert(id.clone(), Arc::new(Mutex::new(session)));
        }
        metrics::counter!("lingo_sessions_started_total", "topic" => started.topic.id.clone())
            .increment(1);

        let previous = self
            .active_by_user
            .write()
            .insert(user_id.to_string(), id.clone());

        tracing::info!(
            session_id = %id,
            user_id = %user_id,
            topic = %started.topic.id,
            target = %started.languages.target,
            "Started practice session"
        );

        if let Some(previous) = previous {
            tracing::info!(
                session_id = %previous,
                user_id = %user_id,
                "Ending previous active session"
            );
            if let Err(e) = self.end_with(&previous, EndCause::Replaced).await {
                tracing::warn!(session_id = %previous, error = %e, "Failed to end previous session");
            }
        }

        Ok(started)
    }

    /// Process one learner utterance
    pub async fn submit_turn(
        &self,
        session_id: &str,
        text: &str,
    ) -> Result<TurnResult, LifecycleError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(LifecycleError::InvalidInput("utterance is empty".to_string()));
        }
        if text.chars().count() > self.config.max_utterance_chars {
            return Err(LifecycleError::InvalidInput(format!(
                "utterance exceeds {} characters",
                self.config.max_utterance_chars
            )));
        }

        let handle = self.get(session_id)?;
        let mut session = handle.lock().await;
        if !session.is_active() {
            return Err(LifecycleError::NoActiveSession(session_id.to_string()));
        }

        let sequence = session.next_sequence();
        let context = self.context.build(
            session_id,
            session.topic(),
            session.languages(),
            session.turns(),
            sequence,
        );

        let started = Instant::now();
        let outcome = tokio::time::timeout(self.config.ai_timeout, self.provider.send(text, &context))
            .await;
        let ai_latency_ms = started.elapsed().as_millis() as u64;

        let turn = match outcome {
            Ok(Ok(feedback)) => {
                let verdict = self.classifier.classify(
                    text,
                    &feedback.feedback_text,
                    feedback.structured_mistakes.as_deref(),
                );
                note_verdict_disagreement(session_id, sequence, &feedback, &verdict);
                Turn::new(sequence, text, &feedback, verdict)
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    session_id = %session_id,
                    provider = self.provider.name(),
                    error = %e,
                    "AI feedback failed, using fallback"
                );
                Turn::fallback(sequence, text)
            }
            Err(_) => {
                tracing::warn!(
                    session_id = %session_id,
                    provider = self.provider.name(),
                    timeout_ms = self.config.ai_timeout.as_millis() as u64,
                    "AI feedback timed out, using fallback"
                );
                Turn::fallback(sequence, text)
            }
        };

        session.push_turn(turn.clone());
        let state = session.score_state();

        tracing::debug!(
            session_id = %session_id,
            sequence,
            verdict = ?turn.verdict,
            category = ?turn.category,
            pattern = ?turn.matched_pattern,
            score = state.accuracy(),
            "Recorded turn"
        );

        self.persist_turn(session_id, &turn).await;

        Ok(TurnResult {
            session_id: session_id.to_string(),
            fallback: turn.is_fallback(),
            turn,
            score: state.accuracy(),
            total_turns: state.total_turns,
            incorrect_turns: state.incorrect_turns,
            ai_latency_ms,
        })
    }

    /// End a session and produce its report
    ///
    /// Ending an already ended session returns the cached report unchanged.
    pub async fn end_session(&self, session_id: &str) -> Result<SessionReport, LifecycleError> {
        self.end_with(session_id, EndCause::Requested).await
    }

    async fn end_with(
        &self,
        session_id: &str,
        cause: EndCause,
    ) -> Result<SessionReport, LifecycleError> {
        let handle = self.get(session_id)?;
        let mut session = handle.lock().await;

        if let Some(report) = session.report() {
            return Ok(report.clone());
        }
        if !session.is_active() {
            return Err(LifecycleError::NoActiveSession(session_id.to_string()));
        }

        let ended_at = Utc::now();
        let state = session.score_state();
        let report = self
            .reports
            .generate(&session, state, session.turns(), ended_at);
        session.finish(report.clone());

        {
            let mut active = self.active_by_user.write();
            if active.get(session.user_id()).map(String::as_str) == Some(session_id) {
                active.remove(session.user_id());
            }
        }

        tracing::info!(
            session_id = %session_id,
            user_id = %session.user_id(),
            total_turns = report.scores.total_turns,
            grammar = report.scores.grammar,
            overall = report.scores.overall,
            duration_seconds = report.duration_seconds,
            cause = cause.as_str(),
            "Ended practice session"
        );
        metrics::counter!("lingo_sessions_ended_total", "cause" => cause.as_str()).increment(1);
        metrics::histogram!("lingo_session_turns").record(report.scores.total_turns as f64);
        metrics::histogram!("lingo_session_grammar_score").record(report.scores.grammar as f64);

        if let Err(e) = self
            .recorder
            .complete_session(session_id, &report.scores, report.duration_seconds)
            .await
        {
            tracing::warn!(session_id = %session_id, error = %e, "Failed to persist session completion");
        }

        Ok(report)
    }

    /// Snapshot of a session
    pub async fn session_info(&self, session_id: &str) -> Result<SessionInfo, LifecycleError> {
        let handle = self.get(session_id)?;
        let session = handle.lock().await;
        let state = session.score_state();

        Ok(SessionInfo {
            session_id: session.id().to_string(),
            user_id: session.user_id().to_string(),
            topic_id: session.topic().id.clone(),
            languages: session.languages(),
            phase: session.phase(),
            turn_count: state.total_turns,
            current_score: state.accuracy(),
            started_at: session.started_at(),
            ended_at: session.ended_at(),
        })
    }

    /// Active session id for a user
    pub fn active_session_for(&self, user_id: &str) -> Option<String> {
        self.active_by_user.read().get(user_id).cloned()
    }

    /// Sessions held in memory
    pub fn count(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn active_count(&self) -> usize {
        self.active_by_user.read().len()
    }

    /// Whether the recorder survives restarts
    pub fn is_durable(&self) -> bool {
        self.recorder.is_durable()
    }

    /// End idle active sessions and drop idle ended ones
    ///
    /// Sessions whose lock is held (a turn in flight) are skipped.
    pub async fn cleanup_expired(&self) -> usize {
        let timeout = self.config.session_timeout;
        let candidates: Vec<(String, SessionHandle)> = self
            .sessions
            .read()
            .iter()
            .map(|(id, handle)| (id.clone(), handle.clone()))
            .collect();

        let mut to_end = Vec::new();
        let mut to_remove = Vec::new();
        for (id, handle) in candidates {
            let Ok(session) = handle.try_lock() else {
                continue;
            };
            if session.idle_for() < timeout {
                continue;
            }
            match session.phase() {
                SessionPhase::Active => to_end.push(id),
                SessionPhase::Ended | SessionPhase::Idle => to_remove.push(id),
            }
        }

        for id in &to_end {
            tracing::info!(session_id = %id, "Ending idle session");
            if let Err(e) = self.end_with(id, EndCause::Idle).await {
                tracing::warn!(session_id = %id, error = %e, "Failed to end idle session");
            }
        }

        if !to_remove.is_empty() {
            let mut sessions = self.sessions.write();
            for id in &to_remove {
                sessions.remove(id);
            }
        }

        to_end.len() + to_remove.len()
    }

    /// Start a background task that periodically runs [`Self::cleanup_expired`]
    ///
    /// Returns a shutdown sender; send `true` to stop the task.
    pub fn start_cleanup_task(self: &Arc<Self>) -> watch::Sender<bool> {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let lifecycle = Arc::clone(self);
        let interval = lifecycle.config.cleanup_interval;

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(interval);
            interval_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        let cleaned = lifecycle.cleanup_expired().await;
                        if cleaned > 0 {
                            tracing::info!(
                                cleaned,
                                remaining = lifecycle.count(),
                                "Session cleanup finished"
                            );
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            tracing::info!("Session cleanup task shutting down");
                            break;
                        }
                    }
                }
            }
        });

        shutdown_tx
    }

    fn get(&self, session_id: &str) -> Result<SessionHandle, LifecycleError> {
        self.sessions
            .read()
            .get(session_id)
            .cloned()
            .ok_or_else(|| LifecycleError::SessionNotFound(session_id.to_string()))
    }

    async fn persist_turn(&self, session_id: &str, turn: &Turn) {
        if let Err(e) = self.recorder.save_turn(session_id, turn).await {
            tracing::warn!(
                session_id = %session_id,
                sequence = turn.sequence,
                error = %e,
                "Failed to persist turn"
            );
        }
        for mistake in &turn.mistakes {
            if let Err(e) = self
                .recorder
                .save_mistake(session_id, turn.sequence, mistake)
                .await
            {
                tracing::warn!(
                    session_id = %session_id,
                    sequence = turn.sequence,
                    error = %e,
                    "Failed to persist mistake"
                );
            }
        }
    }
}

/// The model's own correct flag is advisory; detected corrections win
fn note_verdict_disagreement(
    session_id: &str,
    sequence: u32,
    feedback: &AiFeedback,
    verdict: &TurnVerdict,
) {
    let Some(model_says_correct) = feedback.structured_verdict else {
        return;
    };
    if model_says_correct == (verdict.verdict == Verdict::Correct) {
        return;
    }
    tracing::debug!(
        session_id = %session_id,
        sequence,
        model_says_correct,
        verdict = verdict.verdict.as_str(),
        pattern = ?verdict.matched_pattern,
        "Model verdict flag disagrees with classified verdict"
    );
    metrics::counter!("lingo_verdict_disagreements_total", "kept" => verdict.verdict.as_str())
        .increment(1);
}

/// Drop ended sessions that are not locked
fn purge_ended(sessions: &mut HashMap<String, SessionHandle>) {
    sessions.retain(|_, handle| match handle.try_lock() {
        Ok(session) => session.phase() != SessionPhase::Ended,
        Err(_) => true,
    });
}
