//! Collaborator traits
//!
//! The session lifecycle talks to everything outside its own decision logic
//! through these traits, so backends can be swapped and mocked in tests.
//!
//! ```text
//! AI feedback:
//!   - FeedbackProvider: utterance + context → reply, critique, structured mistakes
//!
//! Persistence:
//!   - SessionRecorder: turns, mistakes, session completion (fire-and-log)
//!
//! Topics:
//!   - TopicResolver: topic id + user id → topic details and language pair
//! ```

mod feedback;
mod recorder;
mod topics;

pub use feedback::FeedbackProvider;
pub use recorder::SessionRecorder;
pub use topics::TopicResolver;
