//! Core traits and types for the language tutor
//!
//! This crate provides foundational types used across all other crates:
//! - Mistake taxonomy, verdicts and turn records
//! - Practice languages and topics
//! - Chat message types
//! - Collaborator traits (AI feedback, persistence, topic resolution)
//! - Error types

pub mod context;
pub mod conversation;
pub mod error;
pub mod feedback;
pub mod language;
pub mod llm_types;
pub mod traits;

pub use context::{ContextPayload, ResolvedTopic, TopicInfo};
pub use conversation::Turn;
pub use error::{Error, Result};
pub use feedback::{
    dominant_category, AiFeedback, FeedbackTone, FinalScores, Mistake, MistakeCategory,
    MistakeKind, ReasonCode, Severity, StructuredMistake, TurnVerdict, Verdict,
    EXTRACTION_PLACEHOLDER, FALLBACK_FEEDBACK, PERFECT_FEEDBACK,
};
pub use language::{Language, LanguagePair};
pub use llm_types::{Message, Role};

pub use traits::{FeedbackProvider, SessionRecorder, TopicResolver};
