//! Running accuracy score
//!
//! One tracker per practice session. The server's own counters are the only
//! source of truth; scores suggested by the AI are never read.

use lingo_core::TurnVerdict;
use serde::{Deserialize, Serialize};

/// Counter snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreState {
    pub total_turns: u32,
    /// Turns with mistakes, excluding fluency-only suggestions
    pub incorrect_turns: u32,
}

impl ScoreState {
    /// Accuracy in 0..=100, 100 when no turns were recorded
    pub fn accuracy(&self) -> u8 {
        if self.total_turns == 0 {
            return 100;
        }
        let correct = self.total_turns.saturating_sub(self.incorrect_turns);
        (100.0 * correct as f64 / self.total_turns as f64).round() as u8
    }
}

/// Per-session correctness counters
#[derive(Debug, Clone, Default)]
pub struct ScoreTracker {
    state: ScoreState,
}

impl ScoreTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one classified turn
    pub fn record_turn(&mut self, verdict: &TurnVerdict) {
        self.record_outcome(verdict.counts_against_score());
    }

    /// Count one turn given whether it was incorrect
    pub fn record_outcome(&mut self, incorrect: bool) {
        self.state.total_turns += 1;
        if incorrect {
            self.state.incorrect_turns += 1;
        }
    }

    pub fn current_score(&self) -> u8 {
        self.state.accuracy()
    }

    pub fn state(&self) -> ScoreState {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = ScoreState::default();
    }
}
